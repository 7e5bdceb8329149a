//! Process-wide table of the built-in codecs.
//!
//! The table is built once, on first use, in a fixed order: the Unicode
//! forms first, then ISO-8859-1, then the legacy code pages. Lookups after
//! that are plain slice scans with no locking. The only mutable piece is
//! the locale codec slot.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use tracing::debug;

use crate::codec::{latin1, legacy, utf16, utf32, utf8, Codec};
use crate::{Error, Result};

/// The set of codecs known to this process.
pub struct Registry {
    codecs: Vec<Codec>,
    locale: ArcSwap<Codec>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// The process-wide registry
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::with_builtins)
    }

    fn with_builtins() -> Self {
        let mut codecs: Vec<Codec> = vec![
            &utf8::UTF_8 as Codec,
            &utf16::UTF_16,
            &utf16::UTF_16BE,
            &utf16::UTF_16LE,
            &utf32::UTF_32,
            &utf32::UTF_32BE,
            &utf32::UTF_32LE,
            &latin1::ISO_8859_1,
        ];
        codecs.extend(legacy::LEGACY_CODECS.iter().map(|codec| codec as Codec));

        assert!(
            codecs
                .iter()
                .enumerate()
                .all(|(i, a)| codecs[i + 1..].iter().all(|b| a.mib_enum() != b.mib_enum())),
            "duplicate MIB in the built-in codec set"
        );
        debug!(count = codecs.len(), "codec registry initialized");

        Self {
            codecs,
            locale: ArcSwap::from_pointee(&utf8::UTF_8 as Codec),
        }
    }

    /// Codecs in registration order
    pub fn iter(&self) -> impl Iterator<Item = Codec> + '_ {
        self.codecs.iter().copied()
    }

    /// Find a codec by canonical name or alias.
    ///
    /// Matching ignores ASCII case, punctuation and spaces, so `utf-8`,
    /// `UTF8` and `utf_8` all find UTF-8.
    pub fn codec_for_name(&self, name: &str) -> Option<Codec> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.iter().find(|codec| {
            names_match(codec.name(), name) || codec.aliases().iter().any(|alias| names_match(alias, name))
        })
    }

    /// Find a codec by IANA MIBenum value
    pub fn codec_for_mib(&self, mib: i32) -> Option<Codec> {
        self.iter().find(|codec| codec.mib_enum() == mib)
    }

    /// Like [`codec_for_name`](Self::codec_for_name), but unknown names are an error
    pub fn resolve(&self, name: &str) -> Result<Codec> {
        self.codec_for_name(name)
            .ok_or_else(|| Error::UnknownEncoding(name.to_owned()))
    }

    /// Every canonical name and alias, in registration order
    pub fn available_codecs(&self) -> Vec<&'static str> {
        self.iter()
            .flat_map(|codec| std::iter::once(codec.name()).chain(codec.aliases().iter().copied()))
            .collect()
    }

    /// Every MIB, in registration order
    pub fn available_mibs(&self) -> Vec<i32> {
        self.iter().map(|codec| codec.mib_enum()).collect()
    }

    /// Codec used for locale-dependent text; UTF-8 until changed
    pub fn codec_for_locale(&self) -> Codec {
        **self.locale.load()
    }

    /// Codec for translated user-facing strings; always UTF-8, whatever the locale codec is
    pub fn codec_for_tr(&self) -> Codec {
        &utf8::UTF_8
    }

    /// Replace the locale codec. The last writer wins.
    pub fn set_codec_for_locale(&self, codec: Codec) {
        debug!(codec = codec.name(), mib = codec.mib_enum(), "locale codec changed");
        self.locale.store(Arc::new(codec));
    }
}

/// Compare two codec names on their ASCII alphanumerics only, ignoring case.
fn names_match(a: &str, b: &str) -> bool {
    significant(a).eq(significant(b))
}

fn significant(name: &str) -> impl Iterator<Item = u8> + '_ {
    name.bytes()
        .filter(u8::is_ascii_alphanumeric)
        .map(|b| b.to_ascii_lowercase())
}

/// Shorthand for [`Registry::codec_for_name`] on the global registry
pub fn codec_for_name(name: &str) -> Option<Codec> {
    Registry::global().codec_for_name(name)
}

/// Shorthand for [`Registry::codec_for_mib`] on the global registry
pub fn codec_for_mib(mib: i32) -> Option<Codec> {
    Registry::global().codec_for_mib(mib)
}

/// Shorthand for [`Registry::available_codecs`] on the global registry
pub fn available_codecs() -> Vec<&'static str> {
    Registry::global().available_codecs()
}

/// Shorthand for [`Registry::available_mibs`] on the global registry
pub fn available_mibs() -> Vec<i32> {
    Registry::global().available_mibs()
}

/// Shorthand for [`Registry::codec_for_locale`] on the global registry
pub fn codec_for_locale() -> Codec {
    Registry::global().codec_for_locale()
}

/// Shorthand for [`Registry::codec_for_tr`] on the global registry
pub fn codec_for_tr() -> Codec {
    Registry::global().codec_for_tr()
}

/// Shorthand for [`Registry::set_codec_for_locale`] on the global registry
pub fn set_codec_for_locale(codec: Codec) {
    Registry::global().set_codec_for_locale(codec)
}
