//! # JPL SPK ephemeris provider
//!
//! [`SpkEphemeris`] reads a NAIF SPK kernel (the binary `.bsp` form of the JPL development
//! ephemerides, DE406 by default) and answers [`EphemerisProvider`] queries from its
//! Chebyshev segments. Positions are chained through segment centres down to the solar
//! system barycenter (NAIF id 0) and returned in AU.
//!
//! Only position segments are supported (SPK types 2 and 3), which is what the planetary
//! DE kernels contain. Other segment types are skipped when loading.
//!
//! ## Kernel files
//!
//! [`kernel_path`] resolves a kernel from an explicit path or from the user cache directory
//! (`<cache>/skypath/jpl_ephem/<version>.bsp`). With the `jpl-download` feature a missing
//! kernel is fetched from the JPL server into that directory.
//!
//! ## See also
//! ------------
//! * [`daf`] – file record and summary chain.
//! * [`segment`] – Chebyshev record evaluation.
//! * [`super::keplerian::KeplerianEphemeris`] – approximate fallback when no kernel is at hand.
use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use hifitime::Epoch;
use nalgebra::Vector3;

use crate::{
    constants::{JulianDay, AU},
    ephemeris::{Body, EphemerisProvider},
    skypath_errors::SkyPathError,
    time::{calendar_from_jdn, Calendar, CalendarDate},
};

pub mod daf;
pub mod segment;

use daf::{read_summaries, DafHeader};
use segment::Segment;

/// Kernel used when none is named.
pub const DEFAULT_KERNEL: &str = "de406";

/// Where missing kernels are downloaded from.
pub const JPL_KERNEL_URL: &str = "https://ssd.jpl.nasa.gov/ftp/eph/planets/bsp";

/// NAIF id of the solar system barycenter.
const SSB: i32 = 0;

/// Longest centre chain followed before giving up (a well-formed kernel needs two links).
const MAX_CHAIN: usize = 8;

/// Candidate NAIF ids for a body, in order of preference.
fn naif_ids(body: Body) -> &'static [i32] {
    match body {
        Body::Sun => &[10],
        Body::Mercury => &[199, 1],
        Body::Venus => &[299, 2],
        Body::Earth => &[399],
        Body::Mars => &[499, 4],
        Body::JupiterBarycenter => &[5],
        Body::SaturnBarycenter => &[6],
        Body::UranusBarycenter => &[7],
        Body::NeptuneBarycenter => &[8],
        Body::PlutoBarycenter => &[9],
    }
}

/// Seconds past J2000 TDB of a TDB Julian Date.
fn et_seconds(jd_tdb: JulianDay) -> f64 {
    Epoch::from_jde_tdb(jd_tdb).to_et_seconds()
}

/// Calendar day (TDB) containing `et`.
fn calendar_day(et: f64) -> CalendarDate {
    let jd = Epoch::from_et_seconds(et).to_jde_tdb_days();
    // segment bounds sit on midnights; keep float noise from slipping a day back
    let jdn = (jd + 0.5 + 1e-6).floor() as i64;
    calendar_from_jdn(jdn, Calendar::Gregorian).into()
}

/// Position segments of one SPK kernel.
#[derive(Debug, Clone)]
pub struct SpkEphemeris {
    name: String,
    segments: HashMap<i32, Vec<Segment>>,
    coverage: (CalendarDate, CalendarDate),
}

impl SpkEphemeris {
    /// Load a kernel from disk.
    ///
    /// Arguments
    /// ---------
    /// * `path`: a `.bsp` file.
    ///
    /// Return
    /// ------
    /// * the provider, [`SkyPathError::IoError`] if the file cannot be read, or
    ///   [`SkyPathError::EphemerisFile`] if it is not a usable SPK kernel.
    pub fn from_file(path: impl AsRef<Utf8Path>) -> Result<Self, SkyPathError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut spk = Self::from_bytes(&bytes)?;
        if spk.name.is_empty() {
            spk.name = path.file_stem().unwrap_or_default().to_string();
        }
        Ok(spk)
    }

    /// Decode a kernel held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkyPathError> {
        let header = DafHeader::parse(bytes)?;
        let summaries = read_summaries(bytes, &header)?;

        let mut segments: HashMap<i32, Vec<Segment>> = HashMap::new();
        for summary in summaries.iter() {
            if !matches!(summary.data_type, 2 | 3) {
                tracing::debug!(
                    naif_id = summary.target,
                    data_type = summary.data_type,
                    "skipping SPK segment"
                );
                continue;
            }
            let segment = Segment::parse(bytes, summary, header.byte_order)?;
            segments.entry(summary.target).or_default().push(segment);
        }

        let spans = segments
            .values()
            .flatten()
            .map(|s| (s.summary.start_et, s.summary.end_et));
        let (start, end) = spans
            .reduce(|(a0, a1), (b0, b1)| (a0.max(b0), a1.min(b1)))
            .filter(|(start, end)| start < end)
            .ok_or_else(|| SkyPathError::EphemerisFile("no position segments with a common span".into()))?;
        let coverage = (calendar_day(start), calendar_day(end));

        tracing::info!(
            kernel = %header.internal_name,
            segments = segments.values().map(Vec::len).sum::<usize>(),
            first = %coverage.0,
            last = %coverage.1,
            "SPK kernel loaded"
        );

        Ok(SpkEphemeris {
            name: header.internal_name,
            segments,
            coverage,
        })
    }

    /// Load the [`DEFAULT_KERNEL`] through [`kernel_path`].
    pub fn de406() -> Result<Self, SkyPathError> {
        Self::from_file(kernel_path(DEFAULT_KERNEL, None)?)
    }

    /// Internal name of the kernel, or its file stem when the name is blank.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// NAIF ids with at least one segment.
    pub fn targets(&self) -> impl Iterator<Item = i32> + '_ {
        self.segments.keys().copied()
    }

    fn segment_for(&self, target: i32, et: f64) -> Option<&Segment> {
        self.segments
            .get(&target)?
            .iter()
            .rev()
            .find(|s| s.summary.covers(et))
    }

    /// Position of `target` relative to the solar system barycenter at `et`, km.
    ///
    /// Arguments
    /// ---------
    /// * `target`: NAIF id.
    /// * `et`: seconds past J2000 TDB.
    ///
    /// Return
    /// ------
    /// * the summed position along the centre chain, or
    ///   [`SkyPathError::MissingEphemerisSegment`] naming the first link with no data at `et`.
    pub fn barycentric_km(&self, target: i32, et: f64) -> Result<Vector3<f64>, SkyPathError> {
        let mut position = Vector3::zeros();
        let mut body = target;
        for _ in 0..MAX_CHAIN {
            if body == SSB {
                return Ok(position);
            }
            let segment = self
                .segment_for(body, et)
                .ok_or(SkyPathError::MissingEphemerisSegment {
                    target: body,
                    et_seconds: et,
                })?;
            position += segment.position(et).unwrap_or_else(Vector3::zeros);
            body = segment.summary.center;
        }
        Err(SkyPathError::EphemerisFile(format!(
            "centre chain of NAIF body {target} does not reach the barycenter"
        )))
    }
}

impl EphemerisProvider for SpkEphemeris {
    fn position(&self, body: Body, jd_tdb: JulianDay) -> Result<Vector3<f64>, SkyPathError> {
        let candidates = naif_ids(body);
        let target = candidates
            .iter()
            .copied()
            .find(|id| self.segments.contains_key(id))
            .unwrap_or(candidates[0]);

        let et = et_seconds(jd_tdb);
        match self.barycentric_km(target, et) {
            Ok(km) => Ok(km / AU),
            Err(SkyPathError::MissingEphemerisSegment { .. })
                if self.segments.contains_key(&target) =>
            {
                let (min, max) = self.coverage;
                Err(SkyPathError::EphemerisRange { min, max })
            }
            Err(e) => Err(e),
        }
    }

    fn coverage(&self) -> (CalendarDate, CalendarDate) {
        self.coverage
    }
}

/// Locate a kernel file.
///
/// Arguments
/// ---------
/// * `version`: kernel name without extension, e.g. `"de406"`.
/// * `user_path`: an explicit file, used as is when given.
///
/// Return
/// ------
/// * the path of an existing file: `user_path`, or `<cache>/skypath/jpl_ephem/<version>.bsp`
///   (downloaded first with the `jpl-download` feature).
/// * [`SkyPathError::IoError`] if `user_path` does not exist, [`SkyPathError::EphemerisFile`]
///   if the kernel is neither cached nor downloadable.
pub fn kernel_path(version: &str, user_path: Option<&Utf8Path>) -> Result<Utf8PathBuf, SkyPathError> {
    if let Some(path) = user_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("JPL kernel not found at {path}"),
        )
        .into());
    }

    let cache_dir = kernel_cache_dir()?;
    let local_file = cache_dir.join(format!("{version}.bsp"));
    if local_file.exists() {
        return Ok(local_file);
    }

    #[cfg(feature = "jpl-download")]
    {
        std::fs::create_dir_all(&cache_dir)?;
        let url = format!("{JPL_KERNEL_URL}/{version}.bsp");
        download::fetch(&url, &local_file)?;
        Ok(local_file)
    }

    #[cfg(not(feature = "jpl-download"))]
    {
        Err(SkyPathError::EphemerisFile(format!(
            "{local_file} not found and the jpl-download feature is disabled"
        )))
    }
}

/// `<cache>/skypath/jpl_ephem`.
pub fn kernel_cache_dir() -> Result<Utf8PathBuf, SkyPathError> {
    let base = BaseDirs::new()
        .ok_or_else(|| SkyPathError::EphemerisFile("no home directory for the kernel cache".into()))?;
    let cache = Utf8Path::from_path(base.cache_dir())
        .ok_or_else(|| SkyPathError::EphemerisFile("cache directory is not UTF-8".into()))?;
    Ok(cache.join("skypath").join("jpl_ephem"))
}

#[cfg(feature = "jpl-download")]
mod download {
    use camino::Utf8Path;
    use tokio::{fs::File, io::AsyncWriteExt};
    use tokio_stream::StreamExt;

    use crate::skypath_errors::SkyPathError;

    fn failed(url: &str, err: impl std::fmt::Display) -> SkyPathError {
        SkyPathError::EphemerisFile(format!("download of {url} failed: {err}"))
    }

    async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), SkyPathError> {
        let mut file = File::create(path).await?;
        tracing::info!(url, "downloading JPL kernel");

        let response = reqwest::get(url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(url, e))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| failed(url, e))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::info!(url, %path, "JPL kernel downloaded");
        Ok(())
    }

    /// Download `url` to `path` through a `.part` file, so an interrupted transfer never
    /// leaves a truncated kernel in the cache.
    pub(super) fn fetch(url: &str, path: &Utf8Path) -> Result<(), SkyPathError> {
        let partial = path.with_extension("bsp.part");
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(download_big_file(url, &partial))?;
        std::fs::rename(&partial, path)?;
        Ok(())
    }
}

/// Synthetic kernels for the reader tests.
#[cfg(test)]
pub(crate) mod spk_test_data {
    use nalgebra::Vector3;

    use super::daf::RECORD_BYTES;

    const WORDS_PER_RECORD: usize = RECORD_BYTES / 8;

    /// A segment whose coordinates are exact quadratics in ET, km.
    #[derive(Debug, Clone)]
    pub struct TestSegment {
        pub target: i32,
        pub center: i32,
        pub data_type: i32,
        /// `[a, b, c]` per axis: `a + b·et + c·et²`.
        pub poly: [[f64; 3]; 3],
        pub init: f64,
        pub intlen: f64,
        pub n_records: usize,
    }

    impl TestSegment {
        /// Four 8-day records centred on J2000, coefficients derived from the ids.
        pub fn linear(target: i32, center: i32) -> Self {
            let scale = 1.0e6 * f64::from(target % 97 + 1);
            let intlen = 8.0 * 86_400.0;
            let n_records = 4;
            TestSegment {
                target,
                center,
                data_type: 2,
                poly: [
                    [scale, 30.0, 1e-6],
                    [-0.5 * scale, -12.0, 2e-6],
                    [0.25 * scale, 5.0, -1e-6],
                ],
                init: -intlen * n_records as f64 / 2.0,
                intlen,
                n_records,
            }
        }

        /// Same positions stored as SPK type 3.
        pub fn with_velocity(mut self) -> Self {
            self.data_type = 3;
            self
        }

        pub fn span(&self) -> (f64, f64) {
            (self.init, self.init + self.intlen * self.n_records as f64)
        }

        pub fn position(&self, et: f64) -> Vector3<f64> {
            let axis = |[a, b, c]: [f64; 3]| a + b * et + c * et * et;
            Vector3::new(axis(self.poly[0]), axis(self.poly[1]), axis(self.poly[2]))
        }

        fn rsize(&self) -> usize {
            if self.data_type == 3 {
                20
            } else {
                11
            }
        }

        /// Records followed by the directory.
        fn words(&self) -> Vec<f64> {
            let radius = self.intlen / 2.0;
            let mut words = Vec::new();
            for i in 0..self.n_records {
                let mid = self.init + (i as f64 + 0.5) * self.intlen;
                words.extend([mid, radius]);
                for [a, b, c] in self.poly {
                    words.extend([
                        a + b * mid + c * mid * mid + c * radius * radius / 2.0,
                        b * radius + 2.0 * c * mid * radius,
                        c * radius * radius / 2.0,
                    ]);
                }
                if self.data_type == 3 {
                    for [_, b, c] in self.poly {
                        words.extend([b + 2.0 * c * mid, 2.0 * c * radius, 0.0]);
                    }
                }
            }
            words.extend([self.init, self.intlen, self.rsize() as f64, self.n_records as f64]);
            words
        }
    }

    fn pad_to_record(bytes: &mut Vec<u8>) {
        let len = bytes.len().div_ceil(RECORD_BYTES) * RECORD_BYTES;
        bytes.resize(len, 0);
    }

    /// Little-endian DAF/SPK image: file record, one summary record, its name record, then
    /// the segment arrays.
    pub fn spk_bytes(segments: &[TestSegment]) -> Vec<u8> {
        let first_data_word = 3 * WORDS_PER_RECORD + 1;
        let arrays: Vec<Vec<f64>> = segments.iter().map(TestSegment::words).collect();
        let data_words: usize = arrays.iter().map(Vec::len).sum();

        let mut bytes = Vec::with_capacity(RECORD_BYTES * 4 + data_words * 8);
        bytes.extend_from_slice(b"DAF/SPK ");
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&6i32.to_le_bytes());
        bytes.extend_from_slice(format!("{:<60}", "SKYPATH TEST KERNEL").as_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&((first_data_word + data_words) as i32).to_le_bytes());
        bytes.extend_from_slice(b"LTL-IEEE");
        pad_to_record(&mut bytes);

        for word in [0.0, 0.0, segments.len() as f64] {
            bytes.extend_from_slice(&f64::to_le_bytes(word));
        }
        let mut address = first_data_word;
        for (segment, words) in segments.iter().zip(&arrays) {
            let (start, end) = segment.span();
            bytes.extend_from_slice(&start.to_le_bytes());
            bytes.extend_from_slice(&end.to_le_bytes());
            let last = address + words.len() - 1;
            for int in [
                segment.target,
                segment.center,
                1,
                segment.data_type,
                address as i32,
                last as i32,
            ] {
                bytes.extend_from_slice(&int.to_le_bytes());
            }
            address = last + 1;
        }
        pad_to_record(&mut bytes);

        // name record
        bytes.resize(bytes.len() + RECORD_BYTES, b' ');

        for word in arrays.iter().flatten() {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        pad_to_record(&mut bytes);
        bytes
    }
}
