//! Region of interest row selection
//!
//! Turns the configured vertical window and stride into the concrete rows
//! of one image. The window is clamped per image since heights may differ
//! from file to file.

/// Vertical region of interest, constant for the lifetime of a reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiSpec {
    /// First row to read
    pub y: usize,
    /// Number of rows to cover, 0 meaning "to the end of the image"
    pub height: usize,
    /// Read every `y_step`-th row
    pub y_step: usize,
}

impl Default for RoiSpec {
    fn default() -> Self {
        RoiSpec { y: 0, height: 0, y_step: 1 }
    }
}

impl RoiSpec {
    /// Creates a new region of interest
    pub fn new(y: usize, height: usize, y_step: usize) -> Self {
        RoiSpec { y, height, y_step }
    }

    /// Clamps the window against an image of `image_height` rows
    ///
    /// An offset past the last row falls back to 0; a height running past
    /// the bottom is cut to the remaining rows.
    pub fn select(&self, image_height: usize) -> RowSelection {
        let start = if self.y >= image_height { 0 } else { self.y };
        let remaining = image_height - start;

        let height = if self.height == 0 || start + self.height > image_height {
            remaining
        } else {
            self.height
        };

        RowSelection {
            start,
            height,
            step: self.y_step.max(1),
        }
    }
}

/// Rows of one image selected by a `RoiSpec`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSelection {
    /// First selected row
    pub start: usize,
    /// Extent of the window in source rows
    pub height: usize,
    /// Distance between selected rows
    pub step: usize,
}

impl RowSelection {
    /// One past the last source row of the window
    pub fn end(&self) -> usize {
        self.start + self.height
    }

    /// Number of rows that end up in the output
    pub fn row_count(&self) -> usize {
        (self.height + self.step - 1) / self.step
    }

    /// Source row indices in output order
    pub fn rows(&self) -> impl Iterator<Item = usize> {
        (self.start..self.end()).step_by(self.step)
    }

    /// Last source row that is actually read
    pub fn last_row(&self) -> Option<usize> {
        match self.row_count() {
            0 => None,
            n => Some(self.start + self.step * (n - 1)),
        }
    }
}
