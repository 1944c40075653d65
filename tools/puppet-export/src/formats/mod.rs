//! Puppet text format
//!
//! Line-oriented UTF-8. A record opens with `type : <kind>`, continues with
//! `key : value` metadata lines and bulk data lines (coordinates, face rows,
//! matrix rows, weight pairs), and ends with a blank line. Nothing is escaped.

use glam::{Mat4, Vec3};
use std::fmt::Display;
use std::io::{self, Write};

use crate::matrix::{format_matrix, format_scalar};

/// Record kinds understood by the Puppet library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Puppet,
    Material,
    Mesh,
    Shape,
    Vertex,
    Face,
    Bone,
    Weights,
    Animation,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Puppet => "puppet",
            RecordKind::Material => "material",
            RecordKind::Mesh => "mesh",
            RecordKind::Shape => "shape",
            RecordKind::Vertex => "vertex",
            RecordKind::Face => "face",
            RecordKind::Bone => "bone",
            RecordKind::Weights => "weights",
            RecordKind::Animation => "animation",
        }
    }
}

/// Writes Puppet records to any `Write`
pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// `type : <kind>`
    pub fn begin(&mut self, kind: RecordKind) -> io::Result<()> {
        self.field("type", kind.as_str())
    }

    /// `key : value`
    pub fn field(&mut self, key: &str, value: impl Display) -> io::Result<()> {
        writeln!(self.inner, "{} : {}", key, value)
    }

    /// `key : <12 matrix fields>`
    pub fn matrix_field(&mut self, key: &str, m: &Mat4) -> io::Result<()> {
        writeln!(self.inner, "{} : {}", key, format_matrix(m))
    }

    /// One matrix row
    pub fn matrix(&mut self, m: &Mat4) -> io::Result<()> {
        writeln!(self.inner, "{}", format_matrix(m))
    }

    /// `x y z`
    pub fn vector(&mut self, v: Vec3) -> io::Result<()> {
        writeln!(
            self.inner,
            "{} {} {}",
            format_scalar(v.x),
            format_scalar(v.y),
            format_scalar(v.z)
        )
    }

    /// Raw bulk data line
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.inner, "{}", text)
    }

    /// Blank line terminating the current record
    pub fn end(&mut self) -> io::Result<()> {
        writeln!(self.inner)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
