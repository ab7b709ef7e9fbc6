// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recursive XY-cut segmentation.
//!
//! The background color is the most frequent border color. Pixels that
//! differ from it by more than the tolerance on any channel are content. A
//! region is split at every run of at least `min_gap` empty rows, then
//! columns, alternating until no split is possible; the remaining regions,
//! trimmed to their content, are the elements.

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::consts::{
    DEFAULT_SEGMENT_COLOR_TOLERANCE, DEFAULT_SEGMENT_MIN_GAP, DEFAULT_SEGMENT_MIN_SIZE,
};
use crate::engine::preprocessing::encode_png;
use crate::errors::SegmentationError;
use crate::traits::{BoundingBox, ImageShape, SegmentElement, SegmentationResult, Segmenter};

const OVERLAY_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_MAX_HEIGHT: u32 = 48;
const TEXT_MIN_ASPECT: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct XyCutSegmenter {
    min_gap: u32,
    color_tolerance: u8,
    min_size: u32,
}

impl Default for XyCutSegmenter {
    fn default() -> Self {
        Self {
            min_gap: DEFAULT_SEGMENT_MIN_GAP,
            color_tolerance: DEFAULT_SEGMENT_COLOR_TOLERANCE,
            min_size: DEFAULT_SEGMENT_MIN_SIZE,
        }
    }
}

impl XyCutSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_gap(mut self, min_gap: u32) -> Self {
        self.min_gap = min_gap.max(1);
        self
    }

    pub fn with_color_tolerance(mut self, tolerance: u8) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size.max(1);
        self
    }

    /// Segment `raster` synchronously, rendering the overlay.
    pub fn segment_blocking(&self, raster: &RgbImage) -> Result<SegmentationResult, SegmentationError> {
        let (width, height) = raster.dimensions();
        let shape = ImageShape {
            height,
            width,
            channels: 3,
        };

        let mut elements = Vec::new();
        if width > 0 && height > 0 {
            let mask = ContentMask::new(raster, self.color_tolerance);
            let whole = BoundingBox {
                row_min: 0,
                row_max: height,
                column_min: 0,
                column_max: width,
            };
            self.cut(&mask, whole, true, &mut elements);
        }

        let rendered_overlay = encode_png(&render_overlay(raster, &elements)).map_err(SegmentationError)?;

        Ok(SegmentationResult {
            image_shape: shape,
            elements,
            rendered_overlay,
        })
    }

    fn cut(&self, mask: &ContentMask, region: BoundingBox, horizontal: bool, out: &mut Vec<SegmentElement>) {
        let Some(region) = mask.trim(region) else {
            return;
        };

        let pieces = self.split(mask, region, horizontal);
        if pieces.len() > 1 {
            for piece in pieces {
                self.cut(mask, piece, !horizontal, out);
            }
            return;
        }

        // No split along this axis; try the other one once before settling.
        let pieces = self.split(mask, region, !horizontal);
        if pieces.len() > 1 {
            for piece in pieces {
                self.cut(mask, piece, horizontal, out);
            }
            return;
        }

        if region.height() >= self.min_size && region.width() >= self.min_size {
            out.push(SegmentElement {
                position: region,
                class: classify(&region).to_string(),
                extra: Default::default(),
            });
        }
    }

    /// Split along rows (`horizontal`) or columns at gaps of at least `min_gap`.
    fn split(&self, mask: &ContentMask, region: BoundingBox, horizontal: bool) -> Vec<BoundingBox> {
        let (start, end) = if horizontal {
            (region.row_min, region.row_max)
        } else {
            (region.column_min, region.column_max)
        };

        let mut pieces = Vec::new();
        let mut piece_start: Option<u32> = None;
        let mut gap = 0;

        for line in start..end {
            let occupied = if horizontal {
                mask.row_has_content(line, region.column_min, region.column_max)
            } else {
                mask.column_has_content(line, region.row_min, region.row_max)
            };

            if occupied {
                if piece_start.is_none() {
                    piece_start = Some(line);
                }
                gap = 0;
            } else {
                gap += 1;
                if gap == self.min_gap {
                    if let Some(first) = piece_start.take() {
                        pieces.push((first, line + 1 - gap));
                    }
                }
            }
        }
        if let Some(first) = piece_start {
            pieces.push((first, end));
        }

        pieces
            .into_iter()
            .map(|(a, b)| {
                if horizontal {
                    BoundingBox { row_min: a, row_max: b, ..region }
                } else {
                    BoundingBox { column_min: a, column_max: b, ..region }
                }
            })
            .collect()
    }
}

#[async_trait]
impl Segmenter for XyCutSegmenter {
    async fn segment(&self, raster: Arc<RgbImage>) -> Result<SegmentationResult, SegmentationError> {
        let segmenter = *self;
        tokio::task::spawn_blocking(move || segmenter.segment_blocking(&raster))
            .await
            .map_err(|e| SegmentationError(e.to_string()))?
    }
}

/// Wide, short regions read as text lines; everything else is a block.
fn classify(region: &BoundingBox) -> &'static str {
    if region.height() <= TEXT_MAX_HEIGHT && region.width() >= region.height() * TEXT_MIN_ASPECT {
        "Text"
    } else {
        "Block"
    }
}

struct ContentMask {
    width: u32,
    content: Vec<bool>,
}

impl ContentMask {
    fn new(raster: &RgbImage, tolerance: u8) -> Self {
        let background = background_color(raster);
        let content = raster
            .pixels()
            .map(|p| {
                p.0.iter()
                    .zip(background.0)
                    .any(|(channel, bg)| channel.abs_diff(bg) > tolerance)
            })
            .collect();
        Self {
            width: raster.width(),
            content,
        }
    }

    fn at(&self, row: u32, column: u32) -> bool {
        self.content[(row * self.width + column) as usize]
    }

    fn row_has_content(&self, row: u32, column_min: u32, column_max: u32) -> bool {
        (column_min..column_max).any(|column| self.at(row, column))
    }

    fn column_has_content(&self, column: u32, row_min: u32, row_max: u32) -> bool {
        (row_min..row_max).any(|row| self.at(row, column))
    }

    /// Shrink `region` to the bounding box of its content.
    fn trim(&self, region: BoundingBox) -> Option<BoundingBox> {
        let rows: Vec<u32> = (region.row_min..region.row_max)
            .filter(|row| self.row_has_content(*row, region.column_min, region.column_max))
            .collect();
        let (first_row, last_row) = (*rows.first()?, *rows.last()?);

        let columns: Vec<u32> = (region.column_min..region.column_max)
            .filter(|column| self.column_has_content(*column, first_row, last_row + 1))
            .collect();
        let (first_column, last_column) = (*columns.first()?, *columns.last()?);

        Some(BoundingBox {
            row_min: first_row,
            row_max: last_row + 1,
            column_min: first_column,
            column_max: last_column + 1,
        })
    }
}

fn background_color(raster: &RgbImage) -> Rgb<u8> {
    let (width, height) = raster.dimensions();
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();

    let border = (0..width)
        .flat_map(|x| [(x, 0), (x, height - 1)])
        .chain((0..height).flat_map(|y| [(0, y), (width - 1, y)]));
    for (x, y) in border {
        *counts.entry(raster.get_pixel(x, y).0).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(color_a, count_a), (color_b, count_b)| count_a.cmp(count_b).then(color_b.cmp(color_a)))
        .map(|(color, _)| Rgb(color))
        .unwrap_or(Rgb([255, 255, 255]))
}

fn render_overlay(raster: &RgbImage, elements: &[SegmentElement]) -> RgbImage {
    let mut overlay = raster.clone();
    for element in elements {
        let b = element.position;
        let (bottom, right) = (b.row_max - 1, b.column_max - 1);
        for column in b.column_min..b.column_max {
            overlay.put_pixel(column, b.row_min, OVERLAY_COLOR);
            overlay.put_pixel(column, bottom, OVERLAY_COLOR);
        }
        for row in b.row_min..b.row_max {
            overlay.put_pixel(b.column_min, row, OVERLAY_COLOR);
            overlay.put_pixel(right, row, OVERLAY_COLOR);
        }
    }
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const INK: Rgb<u8> = Rgb([20, 20, 20]);

    fn canvas(width: u32, height: u32, boxes: &[(u32, u32, u32, u32)]) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let inside = boxes
                .iter()
                .any(|(r0, r1, c0, c1)| (*r0..*r1).contains(&y) && (*c0..*c1).contains(&x));
            if inside {
                INK
            } else {
                WHITE
            }
        })
    }

    fn positions(result: &SegmentationResult) -> Vec<(u32, u32, u32, u32)> {
        let mut positions: Vec<_> = result
            .elements
            .iter()
            .map(|e| (e.position.row_min, e.position.row_max, e.position.column_min, e.position.column_max))
            .collect();
        positions.sort();
        positions
    }

    #[test]
    fn test_xy_cut_table_driven() {
        struct TestCase {
            name: &'static str,
            boxes: Vec<(u32, u32, u32, u32)>,
            expected: Vec<(u32, u32, u32, u32)>,
        }

        let test_cases = vec![
            TestCase { name: "blank page", boxes: vec![], expected: vec![] },
            TestCase {
                name: "single block",
                boxes: vec![(10, 40, 10, 40)],
                expected: vec![(10, 40, 10, 40)],
            },
            TestCase {
                name: "two rows",
                boxes: vec![(5, 20, 10, 90), (50, 80, 10, 90)],
                expected: vec![(5, 20, 10, 90), (50, 80, 10, 90)],
            },
            TestCase {
                name: "two columns",
                boxes: vec![(10, 60, 5, 30), (10, 60, 60, 95)],
                expected: vec![(10, 60, 5, 30), (10, 60, 60, 95)],
            },
            TestCase {
                name: "gap below threshold keeps one region",
                boxes: vec![(10, 30, 10, 90), (33, 50, 10, 90)],
                expected: vec![(10, 50, 10, 90)],
            },
            TestCase {
                name: "specks are discarded",
                boxes: vec![(10, 40, 10, 40), (70, 72, 70, 72)],
                expected: vec![(10, 40, 10, 40)],
            },
        ];

        for test_case in test_cases {
            let raster = canvas(100, 100, &test_case.boxes);
            let result = XyCutSegmenter::new().segment_blocking(&raster).unwrap();
            assert_eq!(positions(&result), test_case.expected, "Test case '{}'", test_case.name);
        }
    }

    #[test]
    fn test_classification() {
        let raster = canvas(200, 100, &[(10, 20, 10, 190), (40, 95, 10, 80)]);
        let result = XyCutSegmenter::new().segment_blocking(&raster).unwrap();

        let classes: Vec<&str> = result.elements.iter().map(|e| e.class.as_str()).collect();
        assert_eq!(classes, vec!["Text", "Block"]);
    }

    #[test]
    fn test_shape_and_overlay() {
        let raster = canvas(64, 32, &[(8, 24, 8, 56)]);
        let result = XyCutSegmenter::new().segment_blocking(&raster).unwrap();

        assert_eq!(result.image_shape, ImageShape { height: 32, width: 64, channels: 3 });

        let overlay = image::load_from_memory(&result.rendered_overlay).unwrap().to_rgb8();
        assert_eq!(overlay.dimensions(), (64, 32));
        assert_eq!(*overlay.get_pixel(8, 8), OVERLAY_COLOR);
        assert_eq!(*overlay.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_dark_background() {
        let raster = RgbImage::from_fn(50, 50, |x, y| {
            if (10..20).contains(&x) && (10..20).contains(&y) {
                Rgb([240, 240, 240])
            } else {
                Rgb([0, 0, 0])
            }
        });

        let result = XyCutSegmenter::new().segment_blocking(&raster).unwrap();
        assert_eq!(positions(&result), vec![(10, 20, 10, 20)]);
    }

    #[tokio::test]
    async fn test_segment_runs_on_blocking_pool() {
        let raster = Arc::new(canvas(40, 40, &[(5, 35, 5, 35)]));
        let result = XyCutSegmenter::new().segment(raster).await.unwrap();
        assert_eq!(result.elements.len(), 1);
    }
}
