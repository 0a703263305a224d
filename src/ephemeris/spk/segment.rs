//! Chebyshev position segments (SPK types 2 and 3).
//!
//! A segment is `N` fixed-length records followed by a four-word directory
//! `[INIT, INTLEN, RSIZE, N]`. Each record covers `INTLEN` seconds starting at
//! `INIT + i·INTLEN` and holds `MID`, `RADIUS` then the Chebyshev coefficients of X, Y and Z
//! (type 3 appends those of the velocity, which are skipped here).
//!
//! ## See also
//! ------------
//! * [`super::daf::Summary`] – where a segment starts and ends in the file.
use nalgebra::Vector3;
use nom::IResult;

use super::daf::{malformed, malformed_file, ByteOrder, Summary};
use crate::skypath_errors::SkyPathError;

/// One Chebyshev record, positions in km.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevRecord {
    /// Centre of the record interval, seconds past J2000 TDB.
    pub mid: f64,
    /// Half-length of the interval, seconds.
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl ChebyshevRecord {
    fn parse(input: &[u8], ncoeff: usize, order: ByteOrder) -> IResult<&[u8], Self> {
        let (input, mid) = order.f64(input)?;
        let (mut input, radius) = order.f64(input)?;

        let mut axes = [Vec::new(), Vec::new(), Vec::new()];
        for axis in axes.iter_mut() {
            axis.reserve_exact(ncoeff);
            for _ in 0..ncoeff {
                let (rest, c) = order.f64(input)?;
                axis.push(c);
                input = rest;
            }
        }
        let [x, y, z] = axes;
        Ok((input, ChebyshevRecord { mid, radius, x, y, z }))
    }

    /// Position at `et` (seconds past J2000 TDB), km.
    ///
    /// `T₀ = 1`, `T₁ = τ`, `Tₙ = 2τTₙ₋₁ − Tₙ₋₂` with `τ = (et − mid) / radius` clamped to [−1, 1].
    pub fn position(&self, et: f64) -> Vector3<f64> {
        let tau = ((et - self.mid) / self.radius).clamp(-1.0, 1.0);
        let n = self.x.len();

        let mut polynomials = vec![0.0; n];
        if n > 0 {
            polynomials[0] = 1.0;
        }
        if n > 1 {
            polynomials[1] = tau;
        }
        for k in 2..n {
            polynomials[k] = 2.0 * tau * polynomials[k - 1] - polynomials[k - 2];
        }

        let series = |coefficients: &[f64]| -> f64 {
            coefficients.iter().zip(&polynomials).map(|(c, t)| c * t).sum()
        };
        Vector3::new(series(&self.x), series(&self.y), series(&self.z))
    }
}

/// Directory trailing a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    /// Start of the first record, seconds past J2000 TDB.
    pub init: f64,
    /// Record length, seconds.
    pub intlen: f64,
    /// Words per record.
    pub rsize: usize,
    pub n_records: usize,
}

impl Directory {
    fn parse(input: &[u8], order: ByteOrder) -> IResult<&[u8], Self> {
        let (input, init) = order.f64(input)?;
        let (input, intlen) = order.f64(input)?;
        let (input, rsize) = order.f64(input)?;
        let (input, n_records) = order.f64(input)?;
        Ok((
            input,
            Directory {
                init,
                intlen,
                rsize: rsize.max(0.0) as usize,
                n_records: n_records.max(0.0) as usize,
            },
        ))
    }
}

/// A decoded segment: its summary, directory and records.
#[derive(Debug, Clone)]
pub struct Segment {
    pub summary: Summary,
    pub directory: Directory,
    records: Vec<ChebyshevRecord>,
}

impl Segment {
    /// Decode the array described by `summary`.
    ///
    /// Arguments
    /// ---------
    /// * `file`: the whole file.
    /// * `summary`: descriptor from the summary chain.
    /// * `order`: numeric encoding of the file.
    ///
    /// Return
    /// ------
    /// * the segment, or [`SkyPathError::EphemerisFile`] for an unsupported data type, a
    ///   directory inconsistent with the array length, or an array running past the file.
    pub fn parse(file: &[u8], summary: &Summary, order: ByteOrder) -> Result<Self, SkyPathError> {
        let context = format!("segment {} → {}", summary.target, summary.center);
        let components = match summary.data_type {
            2 => 3,
            3 => 6,
            other => return Err(malformed_file(&context, &format!("unsupported SPK type {other}"))),
        };

        let words = summary
            .initial_addr
            .checked_sub(1)
            .filter(|_| summary.final_addr >= summary.initial_addr + 3)
            .and_then(|first| file.get(first * 8..summary.final_addr * 8))
            .ok_or_else(|| malformed_file(&context, "array outside the file"))?;

        let (_, directory) =
            Directory::parse(&words[words.len() - 32..], order).map_err(|e| malformed(&context, e))?;
        let Directory { rsize, n_records, .. } = directory;
        if rsize <= 2 || (rsize - 2) % components != 0 || directory.intlen <= 0.0 || n_records == 0 {
            return Err(malformed_file(&context, &format!("directory {directory:?}")));
        }
        if n_records * rsize * 8 + 32 != words.len() {
            return Err(malformed_file(&context, "directory does not match the array length"));
        }

        let ncoeff = (rsize - 2) / components;
        let records = words[..n_records * rsize * 8]
            .chunks_exact(rsize * 8)
            .map(|chunk| {
                ChebyshevRecord::parse(chunk, ncoeff, order)
                    .map(|(_, record)| record)
                    .map_err(|e| malformed(&context, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Segment {
            summary: summary.clone(),
            directory,
            records,
        })
    }

    /// Position of the target relative to the centre at `et`, km; `None` outside the span.
    pub fn position(&self, et: f64) -> Option<Vector3<f64>> {
        if !self.summary.covers(et) {
            return None;
        }
        let index = ((et - self.directory.init) / self.directory.intlen).floor();
        let index = (index.max(0.0) as usize).min(self.records.len() - 1);
        Some(self.records[index].position(et))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
