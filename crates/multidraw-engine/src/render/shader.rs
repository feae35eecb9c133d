//! Shader stages as plain data.
//!
//! Every stage is WGSL text plus the metadata wgpu needs to bind it. Sources
//! are validated with naga before they reach the device, so a broken shader
//! surfaces as an `Err` carrying the diagnostic instead of a device panic.

use std::fmt;

use anyhow::{Context, Result};

/// Pipeline stage a shader source is written for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// One shader stage: WGSL source and the entry point to bind.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub label: &'static str,
    pub entry_point: &'static str,
    pub wgsl: &'static str,
}

impl ShaderSource {
    /// Parses and validates the WGSL, and checks that `entry_point` exists
    /// for `stage`.
    pub fn validate(&self) -> Result<()> {
        let module = naga::front::wgsl::parse_str(self.wgsl).map_err(|e| {
            anyhow::anyhow!(
                "{} shader '{}' failed to parse:\n{}",
                self.stage,
                self.label,
                e.emit_to_string(self.wgsl)
            )
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .map_err(|e| {
            anyhow::anyhow!(
                "{} shader '{}' failed validation:\n{}",
                self.stage,
                self.label,
                e.emit_to_string(self.wgsl)
            )
        })?;

        let stage = self.stage.naga_stage();
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == stage && ep.name == self.entry_point);
        anyhow::ensure!(
            found,
            "{} shader '{}' has no {} entry point '{}'",
            self.stage,
            self.label,
            self.stage,
            self.entry_point
        );

        Ok(())
    }
}

/// Validates `source` and creates its shader module on `device`.
pub fn compile_stage(device: &wgpu::Device, source: &ShaderSource) -> Result<wgpu::ShaderModule> {
    source
        .validate()
        .with_context(|| format!("cannot compile {} stage", source.stage))?;

    log::debug!("compiling {} shader '{}'", source.stage, source.label);
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(source.label),
        source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_VS: ShaderSource = ShaderSource {
        stage: ShaderStage::Vertex,
        label: "test vs",
        entry_point: "vs_main",
        wgsl: "@vertex fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {\n    return vec4<f32>(p, 0.0, 1.0);\n}\n",
    };

    #[test]
    fn valid_stage_passes() {
        assert!(GOOD_VS.validate().is_ok());
    }

    #[test]
    fn syntax_error_names_the_stage() {
        let broken = ShaderSource {
            wgsl: "@vertex fn vs_main( -> {",
            ..GOOD_VS
        };
        let err = broken.validate().unwrap_err().to_string();
        assert!(err.contains("vertex shader 'test vs'"), "{err}");
    }

    #[test]
    fn type_error_fails_validation() {
        let broken = ShaderSource {
            wgsl: "@vertex fn vs_main() -> @builtin(position) vec4<f32> {\n    return vec2<f32>(0.0, 0.0);\n}\n",
            ..GOOD_VS
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let wrong = ShaderSource {
            entry_point: "main",
            ..GOOD_VS
        };
        let err = wrong.validate().unwrap_err().to_string();
        assert!(err.contains("no vertex entry point 'main'"), "{err}");
    }

    #[test]
    fn stage_mismatch_is_reported() {
        let wrong = ShaderSource {
            stage: ShaderStage::Fragment,
            ..GOOD_VS
        };
        assert!(wrong.validate().is_err());
    }
}
