use super::*;

#[test]
fn defaults_are_valid() {
    assert!(RasterOpts::default().validate().is_ok());
    let cfg = ServerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.listen.port(), 8790);
    assert_eq!(cfg.compose.raster.max_dim, MAX_RASTER_DIM);
}

#[test]
fn raster_scale_must_be_positive() {
    for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let opts = RasterOpts {
            scale,
            ..RasterOpts::default()
        };
        assert!(matches!(opts.validate(), Err(DrapeError::Input(_))), "{scale}");
    }
}

#[test]
fn server_config_rejects_zero_limits() {
    let cfg = ServerConfig {
        max_upload_bytes: 0,
        ..ServerConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = ServerConfig {
        compose: ComposeOpts {
            raster_timeout: Duration::ZERO,
            ..ComposeOpts::default()
        },
        ..ServerConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = ServerConfig {
        compose: ComposeOpts {
            raster: RasterOpts {
                max_dim: 0,
                ..RasterOpts::default()
            },
            ..ComposeOpts::default()
        },
        ..ServerConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(DrapeError::Input(_))));
}
