//! Binary segment extraction.
//!
//! Copies a byte range of one decoded channel into a caller-owned buffer and
//! marks the matching status elements as filled. A file whose decoded length
//! differs from the nominal length is treated as incomplete and skipped.

use tracing::warn;

use crate::api::channel_file::ChannelFile;
use crate::cancel::CancellationToken;
use crate::error::Tob1Error;

/// Status value of an element that received data.
pub const FILLED: u8 = 1;

/// Which part of which channel to copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Name as stored in the file (not the catalog identifier).
    pub original_name: String,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Elements a complete file holds for this channel.
    pub expected_element_count: usize,
    pub element_size: usize,
}

impl Segment {
    pub fn element_count(&self) -> usize {
        self.byte_length / self.element_size.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Filled { elements: usize },
    /// Decoded length did not match the nominal length; nothing was written.
    Incomplete { expected: usize, actual: usize },
}

/// Copy `segment` from `file` into `data`, marking `status`.
///
/// # Arguments
/// * `file` - An opened file
/// * `segment` - Channel and byte range to copy
/// * `data` - Destination, exactly `segment.byte_length` bytes
/// * `status` - One status byte per destination element
/// * `cancel` - Checked after decoding, before anything is written
///
/// # Returns
/// [`Extraction::Filled`] or [`Extraction::Incomplete`]; errors for a missing
/// channel, an out of bounds range or a mis-sized destination. On error and
/// on `Incomplete` neither destination is modified.
pub fn extract<F: ChannelFile + ?Sized>(
    file: &F,
    segment: &Segment,
    data: &mut [u8],
    status: &mut [u8],
    cancel: &CancellationToken,
) -> Result<Extraction, Tob1Error> {
    if data.len() != segment.byte_length {
        return Err(Tob1Error::DestinationMismatch { actual: data.len(), expected: segment.byte_length });
    }
    let elements = segment.element_count();
    let whole_elements = elements.checked_mul(segment.element_size) == Some(segment.byte_length);
    if status.len() != elements || !whole_elements {
        return Err(Tob1Error::DestinationMismatch { actual: status.len(), expected: elements });
    }

    let descriptor = file
        .find_channel(&segment.original_name)
        .ok_or_else(|| Tob1Error::ChannelNotFound(segment.original_name.clone()))?;
    let buffer = file.read_raw(descriptor)?;

    let expected = segment
        .expected_element_count
        .checked_mul(segment.element_size)
        .ok_or(Tob1Error::DestinationMismatch {
            actual: buffer.len(),
            expected: segment.expected_element_count,
        })?;
    if buffer.len() != expected {
        warn!(
            channel = %segment.original_name,
            expected,
            actual = buffer.len(),
            "decoded length does not match the nominal length, skipping incomplete file"
        );
        return Ok(Extraction::Incomplete { expected, actual: buffer.len() });
    }

    let out_of_bounds = |end| Tob1Error::RangeOutOfBounds {
        offset: segment.byte_offset,
        end,
        available: buffer.len(),
    };
    let end = segment
        .byte_offset
        .checked_add(segment.byte_length)
        .ok_or_else(|| out_of_bounds(usize::MAX))?;
    if end > buffer.len() {
        return Err(out_of_bounds(end));
    }

    if cancel.is_cancelled() {
        return Err(Tob1Error::Cancelled);
    }
    data.copy_from_slice(&buffer[segment.byte_offset..end]);
    status.fill(FILLED);

    Ok(Extraction::Filled { elements })
}
