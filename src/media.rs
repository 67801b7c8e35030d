//! Fit-to-box resizing of uploaded images.
//!
//! Decoding and encoding are CPU bound, so [`resize_async`] moves them onto
//! the blocking thread pool instead of stalling the runtime.

use std::io::Cursor;

use axum::body::Bytes;
use image::{imageops::FilterType, DynamicImage, ImageOutputFormat};

pub const MAX_WIDTH: u32 = 900;
pub const MAX_HEIGHT: u32 = 600;
/// JPEG quality of re-encoded images (0-100).
pub const JPEG_QUALITY: u8 = 80;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to process image: {0}")]
	Image(#[from] image::ImageError),
	#[error("resize task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
}

/// A re-encoded JPEG image.
#[derive(Debug)]
pub struct Resized {
	pub data: Bytes,
	pub width: u32,
	pub height: u32,
}

/// Calculates the size of an image scaled to fit within `max_width` x `max_height`,
/// preserving its aspect ratio.
///
/// If the image is proportionally wider than the box, it is scaled by the width
/// ratio and its height is derived, otherwise it is scaled by the height ratio.
/// Images that already fit are left as-is.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
	if width <= max_width && height <= max_height {
		return (width.max(1), height.max(1));
	}

	let (width, height) = (u64::from(width), u64::from(height));
	let (max_width, max_height) = (u64::from(max_width), u64::from(max_height));

	// width / height > max_width / max_height, without the division
	let (new_width, new_height) = if width * max_height > height * max_width {
		(max_width, (height * max_width + width / 2) / width)
	} else {
		((width * max_height + height / 2) / height, max_height)
	};

	// Both are bounded by the maximums, which are `u32`
	#[allow(clippy::cast_possible_truncation)]
	(new_width.max(1) as u32, new_height.max(1) as u32)
}

/// Decodes `data`, fits it within [`MAX_WIDTH`] x [`MAX_HEIGHT`] and
/// re-encodes it as a JPEG with [`JPEG_QUALITY`].
pub fn resize(data: &[u8]) -> Result<Resized, Error> {
	let image = image::load_from_memory(data)?;
	let (width, height) = fit_within(image.width(), image.height(), MAX_WIDTH, MAX_HEIGHT);

	tracing::debug!(
		original_width = image.width(),
		original_height = image.height(),
		width,
		height,
		"resizing image"
	);

	let image = if (width, height) == (image.width(), image.height()) {
		image
	} else {
		image.resize_exact(width, height, FilterType::Triangle)
	};

	// JPEG has no alpha channel
	let image = DynamicImage::ImageRgb8(image.to_rgb8());
	let mut buffer = Cursor::new(Vec::new());

	image.write_to(&mut buffer, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;

	Ok(Resized {
		data: buffer.into_inner().into(),
		width,
		height,
	})
}

/// Runs [`resize`] on the blocking thread pool.
pub async fn resize_async(data: Bytes) -> Result<Resized, Error> {
	tokio::task::spawn_blocking(move || resize(&data)).await?
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test::png;

	#[test]
	fn test_fit_landscape() {
		assert_eq!(fit_within(1800, 600, MAX_WIDTH, MAX_HEIGHT), (900, 300));
	}

	#[test]
	fn test_fit_portrait() {
		assert_eq!(fit_within(600, 1800, MAX_WIDTH, MAX_HEIGHT), (200, 600));
	}

	#[test]
	fn test_fit_wide_but_box_bound_by_height() {
		// Wider than tall, but proportionally taller than 3:2
		assert_eq!(fit_within(1000, 900, MAX_WIDTH, MAX_HEIGHT), (667, 600));
	}

	#[test]
	fn test_fit_exact_ratio() {
		assert_eq!(fit_within(1800, 1200, MAX_WIDTH, MAX_HEIGHT), (900, 600));
	}

	#[test]
	fn test_fit_does_not_upscale() {
		assert_eq!(fit_within(300, 200, MAX_WIDTH, MAX_HEIGHT), (300, 200));
	}

	#[test]
	fn test_fit_never_zero() {
		assert_eq!(fit_within(10_000, 1, MAX_WIDTH, MAX_HEIGHT), (900, 1));
	}

	#[test]
	fn test_resize_reencodes_as_jpeg() {
		let resized = resize(&png(1800, 600)).unwrap();

		assert_eq!((resized.width, resized.height), (900, 300));
		assert_eq!(
			image::guess_format(&resized.data).unwrap(),
			image::ImageFormat::Jpeg
		);

		let decoded = image::load_from_memory(&resized.data).unwrap();
		assert_eq!((decoded.width(), decoded.height()), (900, 300));
	}

	#[test]
	fn test_resize_rejects_garbage() {
		assert!(matches!(resize(b"not an image"), Err(Error::Image(..))));
	}
}
