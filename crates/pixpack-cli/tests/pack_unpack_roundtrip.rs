use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SHIFT: u8 = 3;

type Px = [u8; 4];

struct Sprite {
    w: u32,
    h: u32,
    px: Vec<Px>,
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pixpack"))
        .args(args)
        .output()
        .expect("spawn pixpack")
}

fn run_ok(args: &[&str]) -> String {
    let out = run(args);
    assert!(
        out.status.success(),
        "command failed: status={:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn write_png(path: &Path, sp: &Sprite) {
    let file = File::create(path).unwrap();
    let mut enc = png::Encoder::new(BufWriter::new(file), sp.w, sp.h);
    enc.set_color(png::ColorType::Rgba);
    enc.set_depth(png::BitDepth::Eight);
    let mut writer = enc.write_header().unwrap();
    let data: Vec<u8> = sp.px.iter().flatten().copied().collect();
    writer.write_image_data(&data).unwrap();
}

fn read_png(path: &Path) -> Sprite {
    let decoder = png::Decoder::new(File::open(path).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgba);
    let px = buf[..info.buffer_size()]
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    Sprite { w: info.width, h: info.height, px }
}

/// Diamond of two inks on a transparent field; `swap` mirrors the inks.
fn diamond(size: u32, ink: [Px; 2], swap: bool) -> Sprite {
    let c = size as i32 / 2;
    let mut px = Vec::new();
    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let d = (x - c).abs() + (y - c).abs();
            let p = if d > c - 1 {
                [0, 0, 0, 0]
            } else if (d % 2 == 0) ^ swap {
                ink[0]
            } else {
                ink[1]
            };
            px.push(p);
        }
    }
    Sprite { w: size, h: size, px }
}

fn alternate(sp: &Sprite) -> Sprite {
    let px = sp
        .px
        .iter()
        .map(|&[r, g, b, a]| if a == 0 { [0, 0, 0, 0] } else { [b, r, g, a] })
        .collect();
    Sprite { w: sp.w, h: sp.h, px }
}

fn expand(v: u8) -> u8 {
    let max = 255u32 >> SHIFT;
    ((v >> SHIFT) as u32 * 255 / max) as u8
}

/// Crop to the opaque bounding box and quantize the way the bundle stores colors.
fn expected(sp: &Sprite) -> Sprite {
    let opaque = |x: u32, y: u32| sp.px[(y * sp.w + x) as usize][3] != 0;
    let xs: Vec<u32> = (0..sp.w).filter(|&x| (0..sp.h).any(|y| opaque(x, y))).collect();
    let ys: Vec<u32> = (0..sp.h).filter(|&y| (0..sp.w).any(|x| opaque(x, y))).collect();
    let (x0, x1) = (xs[0], *xs.last().unwrap());
    let (y0, y1) = (ys[0], *ys.last().unwrap());
    let mut px = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            let [r, g, b, a] = sp.px[(y * sp.w + x) as usize];
            px.push(if a == 0 { [0, 0, 0, 0] } else { [expand(r), expand(g), expand(b), 255] });
        }
    }
    Sprite { w: x1 - x0 + 1, h: y1 - y0 + 1, px }
}

fn rainbow() -> Sprite {
    let px = (0..16u8).map(|i| [i * 16, 255 - i * 16, 7, 255]).collect();
    Sprite { w: 16, h: 1, px }
}

struct Fixture {
    _tmp: tempfile::TempDir,
    primary: PathBuf,
    alternate: PathBuf,
    root: PathBuf,
    kept: Vec<(Sprite, Sprite)>,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    let primary = root.join("primary");
    let alternate_dir = root.join("alternate");
    fs::create_dir_all(&primary).unwrap();
    fs::create_dir_all(&alternate_dir).unwrap();

    let red = [250, 10, 10, 255];
    let gold = [240, 200, 16, 255];
    let teal = [0, 128, 128, 255];
    let files = [
        ("logo.png", diamond(11, [teal, gold], false)),
        ("walk_0.png", diamond(13, [red, gold], false)),
        ("walk_1.png", diamond(13, [red, gold], true)),
        ("zz_rainbow.png", rainbow()),
    ];

    let mut kept = Vec::new();
    for (name, sp) in files {
        let alt = alternate(&sp);
        write_png(&primary.join(name), &sp);
        write_png(&alternate_dir.join(name), &alt);
        if name != "zz_rainbow.png" {
            kept.push((sp, alt));
        }
    }
    Fixture { _tmp: tmp, primary, alternate: alternate_dir, root, kept }
}

#[test]
fn pack_verify_unpack_roundtrip() {
    let fx = fixture();
    let bundle = fx.root.join("out/sprites.pxb");
    let unpacked = fx.root.join("unpacked");

    let log = run_ok(&[
        "pack",
        "--primary",
        s(&fx.primary),
        "--alternate",
        s(&fx.alternate),
        "--out",
        s(&bundle),
        "--group-by-prefix",
    ]);
    assert!(log.contains("pack ok: images=3 skipped=1"), "{log}");
    assert!(log.contains("zz_rainbow.png"), "{log}");

    let log = run_ok(&["verify", "--in", s(&bundle)]);
    assert!(log.contains("verify ok: images=3"), "{log}");

    let log = run_ok(&["inspect", "--in", s(&bundle), "--images"]);
    assert!(log.contains("zstd_bytes"), "{log}");
    assert!(log.contains("color_shift  = 3"), "{log}");

    run_ok(&["unpack", "--in", s(&bundle), "--out", s(&unpacked)]);
    for (k, (prim, alt)) in fx.kept.iter().enumerate() {
        for (suffix, src) in [("primary", prim), ("alternate", alt)] {
            let got = read_png(&unpacked.join(format!("{k:04}_{suffix}.png")));
            let want = expected(src);
            assert_eq!((got.w, got.h), (want.w, want.h), "image {k} {suffix} size");
            assert_eq!(got.px, want.px, "image {k} {suffix} pixels");
        }
    }
}

#[test]
fn repeated_pack_is_byte_identical() {
    let fx = fixture();
    let a = fx.root.join("a.pxb");
    let b = fx.root.join("b.pxb");
    for out in [&a, &b] {
        run_ok(&["pack", "--primary", s(&fx.primary), "--out", s(out), "--group-by-prefix"]);
    }
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn missing_alternate_file_fails() {
    let fx = fixture();
    fs::remove_file(fx.alternate.join("walk_1.png")).unwrap();
    let out = run(&[
        "pack",
        "--primary",
        s(&fx.primary),
        "--alternate",
        s(&fx.alternate),
        "--out",
        s(&fx.root.join("x.pxb")),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing alternate variant"));
}

#[test]
fn corrupted_bundle_fails_verify() {
    let fx = fixture();
    let bundle = fx.root.join("c.pxb");
    run_ok(&["pack", "--primary", s(&fx.primary), "--out", s(&bundle)]);

    let mut bytes = fs::read(&bundle).unwrap();
    bytes[6] ^= 0xFF;
    fs::write(&bundle, &bytes).unwrap();

    let out = run(&["verify", "--in", s(&bundle)]);
    assert!(!out.status.success());
}

#[test]
fn invalid_params_are_rejected() {
    let fx = fixture();
    let out = run(&[
        "pack",
        "--primary",
        s(&fx.primary),
        "--out",
        s(&fx.root.join("bad.pxb")),
        "--max-run",
        "300",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("max_run"));
}
