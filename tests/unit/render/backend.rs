use super::*;

fn frame(data: Vec<u8>) -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: (data.len() / 4) as u32,
        data,
        premultiplied: true,
    }
}

#[test]
fn fingerprint_tracks_pixels_and_size() {
    let a = frame(vec![1, 2, 3, 255]);
    let b = frame(vec![1, 2, 3, 255]);
    let c = frame(vec![1, 2, 4, 255]);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());

    let mut wide = a.clone();
    wide.width = 2;
    assert_ne!(a.fingerprint(), wide.fingerprint());
}

#[test]
fn straight_conversion_unpremultiplies() {
    let f = frame(vec![128, 0, 0, 128, 0, 0, 0, 0, 10, 20, 30, 255]);
    assert_eq!(
        f.to_straight_rgba8(),
        vec![255, 0, 0, 128, 0, 0, 0, 0, 10, 20, 30, 255]
    );
}
