//! Tractate catalog and canonical-name lookup.

/// One tractate of the Babylonian Talmud.
#[derive(Debug, Clone, Copy)]
pub struct Masechet {
    /// Name as the upstream service spells it in references.
    pub canonical_name: &'static str,
    /// Other spellings users commonly type.
    pub aliases: &'static [&'static str],
}

const fn masechet(canonical_name: &'static str, aliases: &'static [&'static str]) -> Masechet {
    Masechet {
        canonical_name,
        aliases,
    }
}

/// All tractates, in canonical order.
pub const MASECHTOT: &[Masechet] = &[
    masechet("Berakhot", &["Brachot", "Berachot", "Brakhot"]),
    masechet("Shabbat", &["Shabbos", "Shabat"]),
    masechet("Eruvin", &["Eiruvin"]),
    masechet("Pesachim", &["Pesahim", "Psachim"]),
    masechet("Rosh Hashanah", &["Rosh Hashana", "RH"]),
    masechet("Yoma", &[]),
    masechet("Sukkah", &["Sukka", "Succah"]),
    masechet("Beitzah", &["Beitza", "Beitsah", "Beitsa", "Beizah"]),
    masechet("Taanit", &["Taanis", "Ta'anit"]),
    masechet("Megillah", &["Megila", "Megilla"]),
    masechet("Moed Katan", &["Moed Qatan"]),
    masechet("Chagigah", &["Hagigah", "Chagiga"]),
    masechet("Yevamot", &["Yevamos", "Yebamot"]),
    masechet("Ketubot", &["Kesubos", "Ketuvot", "Ketubos"]),
    masechet("Nedarim", &[]),
    masechet("Nazir", &[]),
    masechet("Sotah", &["Sota"]),
    masechet("Gittin", &["Gitin"]),
    masechet("Kiddushin", &["Kidushin"]),
    masechet("Bava Kamma", &["Bava Kama", "Baba Kamma", "BK"]),
    masechet("Bava Metzia", &["Baba Metzia", "Bava Metziah", "BM"]),
    masechet("Bava Batra", &["Bava Basra", "Baba Batra", "BB"]),
    masechet("Sanhedrin", &[]),
    masechet("Makkot", &["Makot", "Makkos"]),
    masechet("Shevuot", &["Shevuos", "Shvuot"]),
    masechet("Avodah Zarah", &["Avoda Zara", "Avodah Zara", "AZ"]),
    masechet("Horayot", &["Horiyot", "Horayos"]),
    masechet("Zevachim", &["Zevahim"]),
    masechet("Menachot", &["Menahot", "Menachos"]),
    masechet("Chullin", &["Hullin", "Chulin"]),
    masechet("Bekhorot", &["Bechorot", "Bechoros"]),
    masechet("Arakhin", &["Arachin"]),
    masechet("Temurah", &["Temura"]),
    masechet("Keritot", &["Kritot", "Kerisos", "Kereitot"]),
    masechet("Meilah", &["Me'ilah", "Meila"]),
    masechet("Tamid", &[]),
    masechet("Niddah", &["Nidah", "Nida"]),
];

/// Lowercase and drop everything but letters and digits, so `bava_kamma`,
/// `Bava Kamma` and `BAVAKAMMA` compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve user input to the canonical tractate name, if it names one.
pub fn canonical_masechet_name(name: &str) -> Option<&'static str> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    MASECHTOT
        .iter()
        .find(|m| {
            normalize(m.canonical_name) == wanted
                || m.aliases.iter().any(|alias| normalize(alias) == wanted)
        })
        .map(|m| m.canonical_name)
}

/// Whether a reference points into a tractate (as opposed to, say, a verse or a
/// code of law).
pub fn is_masechet_ref(reference: &str) -> bool {
    MASECHTOT
        .iter()
        .any(|m| reference.starts_with(m.canonical_name))
}
