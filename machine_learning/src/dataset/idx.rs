//! Readers for the IDX file format, used to distribute the MNIST family of image datasets.
//!
//! Every file starts with a big-endian `u32` magic number followed by one big-endian `u32` per
//! dimension. Files ending in `.gz` are decompressed on the fly.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use flate2::read::GzDecoder;
use ndarray::{Array1, Array2};

use super::Dataset;
use crate::{MlErr, Result};

const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

/// Reads an IDX image file into an `(images, rows * cols)` matrix of raw pixel values in
/// `[0, 255]`.
pub fn read_images<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    parse_images(open(path.as_ref())?)
}

/// Reads an IDX label file.
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Array1<usize>> {
    parse_labels(open(path.as_ref())?)
}

/// Reads a pair of IDX image and label files into a `Dataset`.
pub fn read_dataset<P, Q>(images: P, labels: Q) -> Result<Dataset>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Dataset::new(read_images(images)?, read_labels(labels)?)
}

/// Parses IDX images from any reader.
pub fn parse_images<R: Read>(mut reader: R) -> Result<Array2<f32>> {
    expect_magic(&mut reader, IMAGES_MAGIC)?;

    let count = read_u32(&mut reader)? as usize;
    let rows = read_u32(&mut reader)? as usize;
    let cols = read_u32(&mut reader)? as usize;

    let x_size = rows
        .checked_mul(cols)
        .ok_or_else(|| MlErr::IdxFormat(format!("image size {rows}x{cols} overflows")))?;
    let len = count
        .checked_mul(x_size)
        .ok_or_else(|| MlErr::IdxFormat(format!("{count} images of {x_size} pixels overflow")))?;

    let pixels = read_body(&mut reader, len, "pixel data")?;

    let data = pixels.into_iter().map(f32::from).collect();
    Array2::from_shape_vec((count, x_size), data)
        .map_err(|e| MlErr::IdxFormat(e.to_string()))
}

/// Parses IDX labels from any reader.
pub fn parse_labels<R: Read>(mut reader: R) -> Result<Array1<usize>> {
    expect_magic(&mut reader, LABELS_MAGIC)?;

    let count = read_u32(&mut reader)? as usize;

    let labels = read_body(&mut reader, count, "label data")?;

    Ok(labels.into_iter().map(usize::from).collect())
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

fn expect_magic<R: Read>(reader: &mut R, expected: u32) -> Result<()> {
    let magic = read_u32(reader)?;

    if magic != expected {
        return Err(MlErr::IdxFormat(format!(
            "magic number {magic:#010x}, expected {expected:#010x}"
        )));
    }

    Ok(())
}

/// Reads exactly `len` bytes, never allocating more than the reader actually yields.
fn read_body<R: Read>(reader: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    reader
        .take(len as u64)
        .read_to_end(&mut body)
        .map_err(|e| MlErr::IdxFormat(format!("unreadable {what}: {e}")))?;

    if body.len() != len {
        return Err(MlErr::IdxFormat(format!(
            "truncated {what}, got {} bytes and expected {len}",
            body.len()
        )));
    }

    Ok(body)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| MlErr::IdxFormat(format!("truncated header: {e}")))?;

    Ok(u32::from_be_bytes(buf))
}
