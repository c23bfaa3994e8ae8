use super::*;

fn frame(data: Vec<u8>, premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data,
        premultiplied,
    }
}

#[test]
fn flatten_transparent_shows_background() {
    let f = frame(vec![0; 8], true);
    let out = f.flatten(BACKGROUND_COLOR).unwrap();
    assert_eq!(out, vec![13, 13, 13, 255, 13, 13, 13, 255]);
}

#[test]
fn flatten_keeps_opaque_pixels() {
    let f = frame(vec![200, 100, 50, 255, 0, 0, 0, 0], true);
    let out = f.flatten(Rgb8::new(255, 255, 255)).unwrap();
    assert_eq!(&out[..4], &[200, 100, 50, 255]);
    assert_eq!(&out[4..], &[255, 255, 255, 255]);
}

#[test]
fn flatten_straight_and_premultiplied_agree() {
    let straight = frame(vec![255, 0, 0, 128, 0, 0, 0, 0], false);
    let premul = frame(vec![128, 0, 0, 128, 0, 0, 0, 0], true);
    let bg = Rgb8::new(0, 0, 0);
    assert_eq!(straight.flatten(bg).unwrap(), premul.flatten(bg).unwrap());
}

#[test]
fn flatten_rejects_short_buffers() {
    assert!(frame(vec![0; 7], true).flatten(BACKGROUND_COLOR).is_err());
}

#[test]
fn pixel_lookup_is_bounds_checked() {
    let f = frame(vec![1, 2, 3, 4, 5, 6, 7, 8], false);
    assert_eq!(f.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(0, 1), None);
}
