//! Indented text dumps for debugging trees.
//!
//! Types implement [`Visualize`] by writing into a [`Drawer`], which keeps
//! track of nesting and indents every line it is handed accordingly.

#![warn(missing_docs)]

use std::{
    fmt,
    io::{Result, Write},
};

use itertools::Itertools;

/// Hex characters kept on each side of an elided digest.
const HEX_EDGE: usize = 8;
const INDENT_SPACES: usize = 4;

/// Pretty, indented rendering of a value.
pub trait Visualize {
    /// Render `self` into `drawer` and hand the drawer back.
    fn visualize<W: Write>(&self, drawer: Drawer<W>) -> Result<Drawer<W>>;
}

/// `Debug` wrapper printing a 32-byte digest as short hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DebugHash(pub [u8; 32]);

impl fmt::Debug for DebugHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

/// `io::Write` proxy that indents continuation lines by nesting level.
pub struct Drawer<W: Write> {
    level: usize,
    write: W,
}

impl<W: Write> Drawer<W> {
    /// Start drawing at level zero.
    pub fn new(write: W) -> Self {
        Drawer { level: 0, write }
    }

    /// Nest one level deeper.
    pub fn down(&mut self) {
        self.level += 1;
    }

    /// Go back up one level.
    pub fn up(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Write `buf`, indenting every line after the first to the current
    /// level.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        let newline = format!("\n{}", " ".repeat(INDENT_SPACES * self.level));
        for chunk in Itertools::intersperse(buf.split(|c| *c == b'\n'), newline.as_bytes()) {
            self.write.write_all(chunk)?;
        }
        Ok(())
    }

    /// Terminate the dump with a newline and flush.
    pub fn flush(&mut self) -> Result<()> {
        self.write.write_all(b"\n")?;
        self.write.flush()
    }
}

/// Hex-encode `bytes`, eliding the middle of long inputs.
pub fn to_hex(bytes: &[u8]) -> String {
    let encoded = hex::encode(bytes);
    if encoded.len() > HEX_EDGE * 3 {
        format!(
            "{}..{}",
            &encoded[..HEX_EDGE],
            &encoded[encoded.len() - HEX_EDGE..]
        )
    } else {
        encoded
    }
}

impl Visualize for [u8; 32] {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(to_hex(self).as_bytes())?;
        Ok(drawer)
    }
}

impl<T: Visualize + ?Sized> Visualize for &T {
    fn visualize<W: Write>(&self, drawer: Drawer<W>) -> Result<Drawer<W>> {
        (*self).visualize(drawer)
    }
}

impl<T: Visualize> Visualize for Option<T> {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        match self {
            Some(value) => value.visualize(drawer),
            None => {
                drawer.write(b"None")?;
                Ok(drawer)
            }
        }
    }
}

/// Render `value` into a `String`.
pub fn visualize_to_string<T: Visualize + ?Sized>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    value.visualize(Drawer::new(&mut out))?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
