use super::*;
use crate::compose::svg::combine_svgs;

const RED_BOX: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 80"><rect width="200" height="80" fill="#ff0000"/></svg>"##;

#[test]
fn single_input_round_trip_keeps_aspect_ratio() {
    let composite = combine_svgs(&[RED_BOX]).unwrap();
    let img = rasterize(&composite.combined_svg_text, &RasterOpts::default()).unwrap();
    assert_eq!((img.width, img.height), (200, 80));

    let decoded = image::load_from_memory(&img.png).unwrap();
    let ratio = f64::from(decoded.width()) / f64::from(decoded.height());
    assert!((ratio - composite.aspect_ratio()).abs() < 0.01);
}

#[test]
fn pixels_are_straight_alpha() {
    let img = rasterize(RED_BOX, &RasterOpts::default()).unwrap();
    let decoded = image::load_from_memory(&img.png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(100, 40).0, [255, 0, 0, 255]);
}

#[test]
fn scale_multiplies_native_size() {
    let opts = RasterOpts {
        scale: 2.0,
        ..RasterOpts::default()
    };
    let img = rasterize(RED_BOX, &opts).unwrap();
    assert_eq!((img.width, img.height), (400, 160));
}

#[test]
fn unparsable_svg_is_a_rasterization_error() {
    let err = rasterize("<svg", &RasterOpts::default()).unwrap_err();
    assert!(matches!(err, DrapeError::Rasterization(_)));
}

#[test]
fn oversized_output_is_rejected() {
    let opts = RasterOpts {
        scale: 1.0,
        max_dim: 100,
    };
    let err = rasterize(RED_BOX, &opts).unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[test]
fn invalid_scale_is_an_input_error() {
    let opts = RasterOpts {
        scale: 0.0,
        ..RasterOpts::default()
    };
    assert!(matches!(
        rasterize(RED_BOX, &opts),
        Err(DrapeError::Input(_))
    ));
}
