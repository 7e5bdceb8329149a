use std::io::Read;
use std::thread;

use textcodec::{
    available_mibs, codec_for_html, codec_for_locale, codec_for_mib, codec_for_name,
    set_codec_for_locale, ConversionFlags, ConversionState, Error, Registry,
};

/// Read `data` through a reader that hands out at most `chunk` bytes per call.
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn transcode_utf16le_file_to_windows_1251() {
    let source = "\u{feff}Привет, мир! Hello!";
    let utf16 = codec_for_name("UTF-16LE").unwrap();
    let cp1251 = codec_for_name("windows-1251").unwrap();

    let input = utf16.make_encoder(ConversionFlags::empty()).from_unicode(source);
    let mut reader = Trickle { data: &input, chunk: 3 };

    let mut decoder = utf16.make_decoder(ConversionFlags::IGNORE_HEADER);
    let mut encoder = cp1251.make_encoder(ConversionFlags::DEFAULT);
    let mut output = Vec::new();
    let mut buf = [0u8; 5];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        output.extend(encoder.from_unicode(&decoder.to_unicode(&buf[..n])));
    }
    assert_eq!(decoder.finish(), 0);
    assert!(!decoder.has_failure());
    assert!(!encoder.has_failure());

    // windows-1251 has no BOM, so DEFAULT writes nothing extra
    assert_eq!(cp1251.to_unicode(&output), "Привет, мир! Hello!");
}

#[test]
fn truncated_stream_is_reported_at_finish() {
    let utf8 = codec_for_name("utf8").unwrap();
    let mut decoder = utf8.make_decoder(ConversionFlags::empty());
    let text = decoder.to_unicode("ab\u{1F600}".as_bytes().split_last().unwrap().1);
    assert_eq!(text, "ab");
    assert!(decoder.needs_more_data());
    assert!(!decoder.has_failure());
    assert_eq!(decoder.finish(), 3);
    assert!(decoder.has_failure());
}

#[test]
fn raw_state_follows_its_codec() {
    let latin1 = codec_for_mib(4).unwrap();
    let koi8 = codec_for_name("KOI8-R").unwrap();
    let mut state = ConversionState::new(ConversionFlags::empty());

    assert_eq!(latin1.from_unicode_with_state("\u{e9}", &mut state).unwrap(), [0xE9]);
    assert_eq!(state.bound_codec(), Some(4));
    assert_eq!(
        koi8.from_unicode_with_state("x", &mut state),
        Err(Error::CodecMismatch { state: 4, codec: 2084 })
    );

    state.reset();
    assert_eq!(koi8.from_unicode_with_state("x", &mut state).unwrap(), b"x");
}

#[test]
fn registry_is_shared_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                let codec = codec_for_name("utf-8").unwrap();
                (codec as *const dyn textcodec::TextCodec as *const () as usize, available_mibs())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(std::ptr::addr_eq(
        Registry::global().codec_for_mib(106).unwrap(),
        codec_for_name("UTF-8").unwrap()
    ));
}

#[test]
fn locale_codec_can_be_replaced() {
    // the only test in this binary touching the global locale slot
    assert_eq!(codec_for_locale().name(), "UTF-8");
    let koi8u = codec_for_name("koi8-u").unwrap();
    set_codec_for_locale(koi8u);
    assert_eq!(codec_for_locale(), koi8u);
    set_codec_for_locale(codec_for_name("UTF-8").unwrap());
}

#[test]
fn html_detection_feeds_a_decoder() {
    let mut page = b"<html><head><meta charset=\"windows-1252\"></head><body>".to_vec();
    page.extend_from_slice(&[0x93, b'q', 0x94, 0x80]);

    let codec = codec_for_html(&page, codec_for_name("UTF-8")).unwrap();
    assert_eq!(codec.name(), "windows-1252");
    assert!(codec.to_unicode(&page).ends_with("\u{201c}q\u{201d}\u{20ac}"));
}
