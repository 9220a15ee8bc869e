//! Client language codes.

use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Returned when a string does not name a supported locale.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown locale code: '{0}'")]
pub struct UnknownLocale(pub String);

/// Declares [`Locale`] from `Variant => "code", "name";` rows.
macro_rules! locales {
    ($($variant:ident => $code:literal, $name:literal;)+) => {
        /// A language code the game client can report.
        ///
        /// The set is closed: every code has a bundled translation table named
        /// after [`Locale::code`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Locale {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl Locale {
            /// Every supported locale, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Canonical code, e.g. `de_de`.
            #[must_use]
            pub const fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// Human readable language name.
            #[must_use]
            pub const fn display_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for Locale {
            type Err = UnknownLocale;

            /// Clients report codes in mixed case (`de_DE`), so matching ignores case.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(UnknownLocale(s.to_string())),
                }
            }
        }
    };
}

locales! {
    AfZa => "af_za", "Afrikaans (Suid-Afrika)";
    ArSa => "ar_sa", "Arabic";
    AstEs => "ast_es", "Asturian";
    AzAz => "az_az", "Azerbaijani";
    BaRu => "ba_ru", "Bashkir";
    Bar => "bar", "Bavarian";
    BeBy => "be_by", "Belarusian";
    BgBg => "bg_bg", "Bulgarian";
    BrFr => "br_fr", "Breton";
    Brb => "brb", "Brabantian";
    BsBa => "bs_ba", "Bosnian";
    CaEs => "ca_es", "Catalan";
    CsCz => "cs_cz", "Czech";
    CyGb => "cy_gb", "Welsh";
    DaDk => "da_dk", "Danish";
    DeAt => "de_at", "Austrian German";
    DeCh => "de_ch", "Swiss German";
    DeDe => "de_de", "German";
    ElGr => "el_gr", "Greek";
    EnAu => "en_au", "Australian English";
    EnCa => "en_ca", "Canadian English";
    EnGb => "en_gb", "British English";
    EnNz => "en_nz", "New Zealand English";
    EnPt => "en_pt", "Pirate English";
    EnUd => "en_ud", "Upside down English";
    EnUs => "en_us", "American English";
    Enp => "enp", "Modern English";
    Enws => "enws", "Early Modern English";
    EoUy => "eo_uy", "Esperanto";
    EsAr => "es_ar", "Argentinian Spanish";
    EsCl => "es_cl", "Chilean Spanish";
    EsEc => "es_ec", "Ecuadorian Spanish";
    EsEs => "es_es", "Spanish";
    EsMx => "es_mx", "Mexican Spanish";
    EsUy => "es_uy", "Uruguayan Spanish";
    EsVe => "es_ve", "Venezuelan Spanish";
    Esan => "esan", "Andalusian";
    EtEe => "et_ee", "Estonian";
    EuEs => "eu_es", "Basque";
    FaIr => "fa_ir", "Persian";
    FiFi => "fi_fi", "Finnish";
    FilPh => "fil_ph", "Filipino";
    FoFo => "fo_fo", "Faroese";
    FrCa => "fr_ca", "Canadian French";
    FrFr => "fr_fr", "French";
    FraDe => "fra_de", "East Franconian";
    FurIt => "fur_it", "Friulian";
    FyNl => "fy_nl", "Frisian";
    GaIe => "ga_ie", "Irish";
    GdGb => "gd_gb", "Scottish Gaelic";
    GlEs => "gl_es", "Galician";
    GotDe => "got_de", "Gothic";
    GvIm => "gv_im", "Manx";
    HawUs => "haw_us", "Hawaiian";
    HeIl => "he_il", "Hebrew";
    HiIn => "hi_in", "Hindi";
    HrHr => "hr_hr", "Croatian";
    HuHu => "hu_hu", "Hungarian";
    HyAm => "hy_am", "Armenian";
    IdId => "id_id", "Indonesian";
    IgNg => "ig_ng", "Igbo";
    IoEn => "io_en", "Ido";
    IsIs => "is_is", "Icelandic";
    Isv => "isv", "Interslavic";
    ItIt => "it_it", "Italian";
    JaJp => "ja_jp", "Japanese";
    JboEn => "jbo_en", "Lojban";
    KaGe => "ka_ge", "Georgian";
    KabKab => "kab_kab", "Kabyle";
    KkKz => "kk_kz", "Kazakh";
    KnIn => "kn_in", "Kannada";
    KoKr => "ko_kr", "Korean";
    Ksh => "ksh", "Kölsch/Ripuarian";
    KwGb => "kw_gb", "Cornish";
    LaLa => "la_la", "Latin";
    LbLu => "lb_lu", "Luxembourgish";
    LiLi => "li_li", "Limburgish";
    Lmo => "lmo", "Lombard";
    LolUs => "lol_us", "LOLCAT";
    LtLt => "lt_lt", "Lithuanian";
    LvLv => "lv_lv", "Latvian";
    Lzh => "lzh", "Classical Chinese";
    MiNz => "mi_nz", "Māori";
    MkMk => "mk_mk", "Macedonian";
    MnMn => "mn_mn", "Mongolian";
    MohCa => "moh_ca", "Mohawk";
    MsMy => "ms_my", "Malay";
    MtMt => "mt_mt", "Maltese";
    NdsDe => "nds_de", "Low German";
    NlBe => "nl_be", "Dutch, Flemish";
    NlNl => "nl_nl", "Dutch";
    NnNo => "nn_no", "Norwegian Nynorsk";
    NoNo => "no_no", "Norwegian Bokmål";
    Nuk => "nuk", "Nuu-chah-nulth";
    OcFr => "oc_fr", "Occitan";
    OjCa => "oj_ca", "Ojibwe";
    Ovd => "ovd", "Elfdalian";
    PlPl => "pl_pl", "Polish";
    PtBr => "pt_br", "Brazilian Portuguese";
    PtPt => "pt_pt", "Portuguese";
    QyaAa => "qya_aa", "Quenya (Form of Elvish from LOTR)";
    RoRo => "ro_ro", "Romanian";
    Rpr => "rpr", "Russian (Pre-revolutionary)";
    RuRu => "ru_ru", "Russian";
    Scn => "scn", "Sicilian";
    SeNo => "se_no", "Northern Sami";
    SkSk => "sk_sk", "Slovak";
    SlSi => "sl_si", "Slovenian";
    SoSo => "so_so", "Somali";
    SqAl => "sq_al", "Albanian";
    SrSp => "sr_sp", "Serbian (Cyrillic/Latin)";
    SvSe => "sv_se", "Swedish";
    Swg => "swg", "Allgovian German";
    Sxu => "sxu", "Upper Saxon German";
    Szl => "szl", "Silesian";
    TaIn => "ta_in", "Tamil";
    ThTh => "th_th", "Thai";
    TlPh => "tl_ph", "Tagalog";
    TlhAa => "tlh_aa", "Klingon";
    Tok => "tok", "Toki Pona";
    TrTr => "tr_tr", "Turkish";
    TtRu => "tt_ru", "Tatar";
    TzlTzl => "tzl_tzl", "Talossan";
    UkUa => "uk_ua", "Ukrainian";
    ValEs => "val_es", "Valencian";
    VecIt => "vec_it", "Venetian";
    ViVn => "vi_vn", "Vietnamese";
    YiDe => "yi_de", "Yiddish";
    YoNg => "yo_ng", "Yoruba";
    ZhCn => "zh_cn", "Chinese Simplified (China; Mandarin)";
    ZhHk => "zh_hk", "Chinese Traditional (Hong Kong; Mix)";
    ZhTw => "zh_tw", "Chinese Traditional (Taiwan; Mandarin)";
    ZlmArab => "zlm_arab", "Malay (Jawi)";
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Locale {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("de_de", Locale::DeDe)]
    #[case("de_DE", Locale::DeDe)]
    #[case("EN_US", Locale::EnUs)]
    #[case("bar", Locale::Bar)]
    #[case("zlm_arab", Locale::ZlmArab)]
    fn parses_codes_case_insensitively(#[case] input: &str, #[case] expected: Locale) {
        assert_eq!(input.parse::<Locale>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("de")]
    #[case("de-de")]
    #[case("xx_xx")]
    fn rejects_unknown_codes(#[case] input: &str) {
        let err = input.parse::<Locale>().unwrap_err();
        assert_eq!(err, UnknownLocale(input.to_string()));
    }

    #[rstest]
    fn codes_round_trip_and_are_unique() {
        let mut seen = HashSet::new();
        for locale in Locale::ALL {
            assert!(seen.insert(locale.code()), "duplicate code {}", locale.code());
            assert_eq!(locale.code().parse::<Locale>().unwrap(), *locale);
            assert_eq!(locale.to_string(), locale.code());
        }
    }

    #[rstest]
    fn display_name_is_language() {
        assert_eq!(Locale::DeDe.display_name(), "German");
        assert_eq!(Locale::EnUs.display_name(), "American English");
    }

    #[rstest]
    fn serde_uses_code() {
        let json = serde_json::to_string(&Locale::FrFr).unwrap();
        assert_eq!(json, "\"fr_fr\"");
        let back: Locale = serde_json::from_str("\"fr_FR\"").unwrap();
        assert_eq!(back, Locale::FrFr);
        assert!(serde_json::from_str::<Locale>("\"nope\"").is_err());
    }
}
