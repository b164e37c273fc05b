/// What this build of the pipeline can do, for health/capability queries.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub gpu_available: bool,
    pub feature_matching: bool,
    pub triangulation: bool,
    pub mesh_optimization: bool,
    pub texture_mapping: bool,
}

/// Probe the accelerator and report the enabled pipeline features.
pub fn capabilities() -> Capabilities {
    Capabilities {
        gpu_available: recon_hal::is_gpu_available(),
        feature_matching: true,
        triangulation: true,
        mesh_optimization: true,
        texture_mapping: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cpu_features_enabled() {
        let caps = capabilities();
        assert!(caps.feature_matching);
        assert!(caps.triangulation);
        assert!(caps.mesh_optimization);
        assert!(caps.texture_mapping);
    }
}
