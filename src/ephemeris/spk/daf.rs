//! DAF (Double precision Array File) container: file record and summary chain.
//!
//! A DAF is a sequence of 1024-byte records addressed in 8-byte words (1-based).
//! Record 1 is the file record; summary records form a doubly linked list starting at
//! `fward`; each summary describes one array (an SPK segment) by its time span, its
//! integer descriptors and the word addresses of its first and last double.
//!
//! | bytes    | field                                  |
//! |----------|----------------------------------------|
//! | 0..8     | `LOCIDW`, e.g. `"DAF/SPK "`            |
//! | 8..16    | `ND`, `NI` (i32)                       |
//! | 16..76   | internal file name                     |
//! | 76..88   | `FWARD`, `BWARD`, `FREE` (i32)         |
//! | 88..96   | `LOCFMT`: `"LTL-IEEE"` or `"BIG-IEEE"` |
//!
//! ## See also
//! ------------
//! * [`super::segment`] – decoding the arrays the summaries point to.
use std::fmt;

use nom::{
    bytes::complete::take,
    number::complete::{be_f64, be_i32, le_f64, le_i32},
    IResult,
};

use crate::skypath_errors::SkyPathError;

/// Size of one DAF record, bytes.
pub const RECORD_BYTES: usize = 1024;

/// Byte offset of `LOCFMT` in the file record.
const LOCFMT_OFFSET: usize = 88;

/// Numeric encoding of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub(crate) fn i32<'a>(self, input: &'a [u8]) -> IResult<&'a [u8], i32> {
        match self {
            ByteOrder::Little => le_i32(input),
            ByteOrder::Big => be_i32(input),
        }
    }

    pub(crate) fn f64<'a>(self, input: &'a [u8]) -> IResult<&'a [u8], f64> {
        match self {
            ByteOrder::Little => le_f64(input),
            ByteOrder::Big => be_f64(input),
        }
    }

    /// Read `LOCFMT`; files written before it existed carry blanks, in which case the order
    /// is the one giving a plausible `ND`.
    fn detect(record: &[u8]) -> Result<Self, SkyPathError> {
        let locfmt = record
            .get(LOCFMT_OFFSET..LOCFMT_OFFSET + 8)
            .map(|b| String::from_utf8_lossy(b).trim().to_string())
            .unwrap_or_default();
        match locfmt.as_str() {
            "LTL-IEEE" => Ok(ByteOrder::Little),
            "BIG-IEEE" => Ok(ByteOrder::Big),
            _ => {
                let nd = record
                    .get(8..12)
                    .and_then(|b| <[u8; 4]>::try_from(b).ok())
                    .ok_or_else(|| malformed_file("file record", "truncated"))?;
                if (1..=124).contains(&i32::from_le_bytes(nd)) {
                    Ok(ByteOrder::Little)
                } else if (1..=124).contains(&i32::from_be_bytes(nd)) {
                    Ok(ByteOrder::Big)
                } else {
                    Err(malformed_file("file record", "unknown numeric format"))
                }
            }
        }
    }
}

pub(crate) fn malformed_file(context: &str, reason: &str) -> SkyPathError {
    SkyPathError::EphemerisFile(format!("{context}: {reason}"))
}

/// Turn a nom failure into a [`SkyPathError::EphemerisFile`] naming the structure being read.
pub(crate) fn malformed(context: &str, err: nom::Err<nom::error::Error<&[u8]>>) -> SkyPathError {
    let reason = match err {
        nom::Err::Incomplete(_) => "truncated".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => format!("{:?} at {} bytes from end", e.code, e.input.len()),
    };
    malformed_file(context, &reason)
}

/// The first record of a DAF.
#[derive(Debug, Clone, PartialEq)]
pub struct DafHeader {
    /// `"DAF/SPK"` for SPK kernels; older files say `"NAIF/DAF"`.
    pub idword: String,
    pub internal_name: String,
    /// Doubles per summary.
    pub nd: usize,
    /// Integers per summary.
    pub ni: usize,
    /// First and last summary records.
    pub fward: usize,
    pub bward: usize,
    /// First free word address.
    pub free: usize,
    pub byte_order: ByteOrder,
}

impl DafHeader {
    /// Decode the file record.
    ///
    /// Arguments
    /// ---------
    /// * `input`: the file contents from byte 0, at least one record long.
    ///
    /// Return
    /// ------
    /// * the header, or [`SkyPathError::EphemerisFile`] when the record is short, the
    ///   identification word is not a DAF one or the summary layout is out of range.
    pub fn parse(input: &[u8]) -> Result<Self, SkyPathError> {
        if input.len() < RECORD_BYTES {
            return Err(malformed_file("file record", "shorter than 1024 bytes"));
        }
        let order = ByteOrder::detect(input)?;
        let (_, header) = Self::fields(input, order).map_err(|e| malformed("file record", e))?;

        if !header.idword.starts_with("DAF/") && header.idword != "NAIF/DAF" {
            return Err(malformed_file("file record", &format!("not a DAF: {:?}", header.idword)));
        }
        if header.nd < 2 || header.ni < 2 || header.nd + header.ni.div_ceil(2) > 125 {
            return Err(malformed_file(
                "file record",
                &format!("summary layout ND={} NI={}", header.nd, header.ni),
            ));
        }
        Ok(header)
    }

    fn fields(input: &[u8], order: ByteOrder) -> IResult<&[u8], Self> {
        let (input, idword) = take(8usize)(input)?;
        let (input, nd) = order.i32(input)?;
        let (input, ni) = order.i32(input)?;
        let (input, internal_name) = take(60usize)(input)?;
        let (input, fward) = order.i32(input)?;
        let (input, bward) = order.i32(input)?;
        let (input, free) = order.i32(input)?;
        Ok((
            input,
            DafHeader {
                idword: String::from_utf8_lossy(idword).trim().to_string(),
                internal_name: String::from_utf8_lossy(internal_name).trim().to_string(),
                nd: nd.max(0) as usize,
                ni: ni.max(0) as usize,
                fward: fward.max(0) as usize,
                bward: bward.max(0) as usize,
                free: free.max(0) as usize,
                byte_order: order,
            },
        ))
    }

    /// Words per summary: `ND + ⌈NI / 2⌉`.
    pub fn summary_words(&self) -> usize {
        self.nd + self.ni.div_ceil(2)
    }
}

impl fmt::Display for DafHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<14} {}", "idword", self.idword)?;
        writeln!(f, "{:<14} {}", "internal name", self.internal_name)?;
        writeln!(f, "{:<14} ND={} NI={}", "summary", self.nd, self.ni)?;
        writeln!(f, "{:<14} {}..{}", "records", self.fward, self.bward)?;
        write!(f, "{:<14} {:?}", "byte order", self.byte_order)
    }
}

/// One array descriptor, restricted to the SPK layout (ND = 2, NI = 6).
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Span covered, seconds past J2000 TDB.
    pub start_et: f64,
    pub end_et: f64,
    /// NAIF id of the body and of the centre it is given relative to.
    pub target: i32,
    pub center: i32,
    /// 1 for J2000/ICRF.
    pub frame: i32,
    /// SPK segment type (2: Chebyshev position, 3: Chebyshev position and velocity).
    pub data_type: i32,
    /// Word addresses of the first and last double of the array.
    pub initial_addr: usize,
    pub final_addr: usize,
}

impl Summary {
    fn parse<'a>(input: &'a [u8], header: &DafHeader) -> IResult<&'a [u8], Self> {
        let order = header.byte_order;
        let (input, start_et) = order.f64(input)?;
        let (input, end_et) = order.f64(input)?;
        let (input, _) = take(8 * (header.nd - 2))(input)?;
        let (input, target) = order.i32(input)?;
        let (input, center) = order.i32(input)?;
        let (input, frame) = order.i32(input)?;
        let (input, data_type) = order.i32(input)?;
        let (input, initial_addr) = order.i32(input)?;
        let (input, final_addr) = order.i32(input)?;
        Ok((
            input,
            Summary {
                start_et,
                end_et,
                target,
                center,
                frame,
                data_type,
                initial_addr: initial_addr.max(0) as usize,
                final_addr: final_addr.max(0) as usize,
            },
        ))
    }

    /// Whether `et` falls inside the span.
    pub fn covers(&self, et: f64) -> bool {
        (self.start_et..=self.end_et).contains(&et)
    }
}

/// Follow the summary-record chain from `fward` and collect every summary.
///
/// Arguments
/// ---------
/// * `file`: the whole file.
/// * `header`: its decoded file record.
///
/// Return
/// ------
/// * the summaries in file order, or [`SkyPathError::EphemerisFile`] on a truncated record
///   or a chain that loops.
pub fn read_summaries(file: &[u8], header: &DafHeader) -> Result<Vec<Summary>, SkyPathError> {
    if header.ni < 6 {
        return Err(malformed_file("summary record", "not an SPK summary layout"));
    }
    let order = header.byte_order;
    let summary_bytes = 8 * header.summary_words();
    let max_records = file.len() / RECORD_BYTES;

    let mut summaries = Vec::new();
    let mut record = header.fward;
    let mut visited = 0;
    while record != 0 {
        visited += 1;
        if visited > max_records {
            return Err(malformed_file("summary record", "chain does not terminate"));
        }
        let bytes = record
            .checked_sub(1)
            .and_then(|r| file.get(r * RECORD_BYTES..(r + 1) * RECORD_BYTES))
            .ok_or_else(|| malformed_file("summary record", &format!("record {record} out of file")))?;

        let (input, next) = order.f64(bytes).map_err(|e| malformed("summary record", e))?;
        let (input, _prev) = order.f64(input).map_err(|e| malformed("summary record", e))?;
        let (mut input, nsum) = order.f64(input).map_err(|e| malformed("summary record", e))?;

        for _ in 0..nsum.max(0.0) as usize {
            let slot = input
                .get(..summary_bytes)
                .ok_or_else(|| malformed_file("summary record", "more summaries than fit"))?;
            let (_, summary) = Summary::parse(slot, header).map_err(|e| malformed("summary", e))?;
            summaries.push(summary);
            input = &input[summary_bytes..];
        }
        record = next.max(0.0) as usize;
    }
    Ok(summaries)
}
