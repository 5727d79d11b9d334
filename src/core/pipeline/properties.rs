//! Property access contract for the surrounding application.

use super::comparer::{ComparerState, ImageComparer};
use super::settings::ComparerSettings;
use crate::core::scanner::ScanMode;
use crate::error::{ComparerError, Result};
use crate::events::{PropertyName, PropertyValue};
use std::path::PathBuf;

/// Read and write the engine's observable properties.
///
/// Every setter fails with [`ComparerError::AlreadyProcessing`] while a run
/// holds the lock, and announces the change as a property event.
pub trait ComparerProperties {
    fn set_input(&self, files: Vec<PathBuf>) -> Result<()>;
    fn input(&self) -> Vec<PathBuf>;
    fn output(&self) -> Vec<PathBuf>;

    fn set_perceptual_hash(&self, enabled: bool) -> Result<()>;
    fn perceptual_hash(&self) -> bool;

    fn set_pixel_by_pixel(&self, enabled: bool) -> Result<()>;
    fn pixel_by_pixel(&self) -> bool;

    fn set_mode(&self, mode: ScanMode) -> Result<()>;
    fn mode(&self) -> ScanMode;

    fn set_output_path(&self, path: Option<PathBuf>) -> Result<()>;
    fn output_path(&self) -> Option<PathBuf>;

    fn settings(&self) -> ComparerSettings;
    /// Replace every setting at once
    fn apply_settings(&self, settings: ComparerSettings) -> Result<()>;
}

impl ImageComparer {
    /// Mutate the state unless a run holds the lock
    fn update<R>(&self, f: impl FnOnce(&mut ComparerState) -> R) -> Result<R> {
        let mut state = self.state();
        if self.is_processing() {
            return Err(ComparerError::AlreadyProcessing);
        }
        Ok(f(&mut state))
    }

    fn set_flag(
        &self,
        name: PropertyName,
        value: bool,
        field: impl FnOnce(&mut ComparerSettings) -> &mut bool,
    ) -> Result<()> {
        let old = self.update(|state| std::mem::replace(field(&mut state.settings), value))?;
        self.events()
            .property_changed(name, PropertyValue::Flag(old), PropertyValue::Flag(value));
        Ok(())
    }
}

impl ComparerProperties for ImageComparer {
    fn set_input(&self, files: Vec<PathBuf>) -> Result<()> {
        let new = files.len();
        let old = self.update(|state| std::mem::replace(&mut state.input, files).len())?;
        self.events()
            .property_changed(PropertyName::Input, PropertyValue::Count(old), PropertyValue::Count(new));
        Ok(())
    }

    fn input(&self) -> Vec<PathBuf> {
        self.state().input.clone()
    }

    fn output(&self) -> Vec<PathBuf> {
        self.state().output.clone()
    }

    fn set_perceptual_hash(&self, enabled: bool) -> Result<()> {
        self.set_flag(PropertyName::PerceptualHash, enabled, |s| &mut s.perceptual_hash)
    }

    fn perceptual_hash(&self) -> bool {
        self.state().settings.perceptual_hash
    }

    fn set_pixel_by_pixel(&self, enabled: bool) -> Result<()> {
        self.set_flag(PropertyName::PixelByPixel, enabled, |s| &mut s.pixel_by_pixel)
    }

    fn pixel_by_pixel(&self) -> bool {
        self.state().settings.pixel_by_pixel
    }

    fn set_mode(&self, mode: ScanMode) -> Result<()> {
        let old = self.update(|state| std::mem::replace(&mut state.settings.mode, mode))?;
        self.events().property_changed(
            PropertyName::Mode,
            PropertyValue::Text(old.to_string()),
            PropertyValue::Text(mode.to_string()),
        );
        Ok(())
    }

    fn mode(&self) -> ScanMode {
        self.state().settings.mode
    }

    fn set_output_path(&self, path: Option<PathBuf>) -> Result<()> {
        let new = path.clone();
        let old = self.update(|state| std::mem::replace(&mut state.settings.output_path, path))?;
        self.events().property_changed(
            PropertyName::OutputPath,
            PropertyValue::Path(old),
            PropertyValue::Path(new),
        );
        Ok(())
    }

    fn output_path(&self) -> Option<PathBuf> {
        self.state().settings.output_path.clone()
    }

    fn settings(&self) -> ComparerSettings {
        self.state().settings.clone()
    }

    fn apply_settings(&self, settings: ComparerSettings) -> Result<()> {
        settings.validate()?;
        self.set_perceptual_hash(settings.perceptual_hash)?;
        self.set_pixel_by_pixel(settings.pixel_by_pixel)?;
        self.set_mode(settings.mode)?;
        self.set_output_path(settings.output_path.clone())?;
        self.update(|state| state.settings = settings)
    }
}
