//! # image-compare CLI
//!
//! Command-line interface for the duplicate image comparer.
//!
//! ## Usage
//! ```bash
//! image-compare scan ~/Pictures
//! image-compare scan ~/Pictures --pixel --move-to ~/Pictures/duplicates
//! image-compare scan ~/Pictures --output json
//! ```

mod cli;

use duplicate_image_comparer::Result;

fn main() -> Result<()> {
    cli::run()
}
