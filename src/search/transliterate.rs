//! Kana to romaji transliteration for cross-script matching.
//!
//! Produces every plausible Latin spelling of a kana string (Hepburn and
//! Kunrei variants, long vowels written out or collapsed) so "さとう" can meet
//! "sato" or "satou". Kanji and Latin text pass through unchanged.

/// Upper bound on spellings produced for one string.
pub const MAX_VARIANTS: usize = 32;

enum Piece {
    Syllable(Vec<String>),
    Sokuon,
    LongVowel,
    Other(char),
}

/// All romaji spellings of `text`, most conventional first.
pub fn romanize(text: &str) -> Vec<String> {
    let pieces = segment(text);
    let mut variants = vec![String::new()];
    let mut pending_sokuon = false;

    for piece in pieces {
        match piece {
            Piece::Syllable(alts) => {
                let mut next = Vec::with_capacity(variants.len() * alts.len());
                for prefix in &variants {
                    for alt in &alts {
                        let mut spelling = prefix.clone();
                        if pending_sokuon {
                            if let Some(first) = alt.chars().next().filter(|c| !is_vowel(*c)) {
                                spelling.push(if alt.starts_with("ch") { 't' } else { first });
                            }
                        }
                        spelling.push_str(alt);
                        next.push(spelling);
                    }
                }
                pending_sokuon = false;
                variants = cap(next);
            }
            Piece::Sokuon => pending_sokuon = true,
            Piece::LongVowel => {
                let mut next = Vec::with_capacity(variants.len() * 2);
                for prefix in &variants {
                    if let Some(vowel) = prefix.chars().last().filter(|c| is_vowel(*c)) {
                        let mut doubled = prefix.clone();
                        doubled.push(vowel);
                        next.push(doubled);
                    }
                    next.push(prefix.clone());
                }
                variants = cap(next);
            }
            Piece::Other(c) => {
                for prefix in &mut variants {
                    prefix.push(c);
                }
            }
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(variants.len() * 2);
    for variant in variants {
        let collapsed = collapse_long_vowels(&variant);
        if !out.contains(&variant) {
            out.push(variant);
        }
        if !out.contains(&collapsed) {
            out.push(collapsed);
        }
    }
    out.truncate(MAX_VARIANTS);
    out
}

/// Fold written-out long vowels: "satou" -> "sato", "yuuki" -> "yuki".
pub fn collapse_long_vowels(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        let long = match (prev, c) {
            (Some('o'), 'u' | 'o') | (Some('u'), 'u') | (Some('a'), 'a') | (Some('i'), 'i') => true,
            (Some('e'), 'e') => true,
            _ => false,
        };
        if !long {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

fn cap(mut variants: Vec<String>) -> Vec<String> {
    variants.dedup();
    variants.truncate(MAX_VARIANTS);
    variants
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

fn to_hiragana(c: char) -> char {
    if ('\u{30A1}'..='\u{30F6}').contains(&c) {
        char::from_u32(c as u32 - 0x60).unwrap_or(c)
    } else {
        c
    }
}

fn segment(text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().map(to_hiragana).collect();
    let mut pieces = Vec::with_capacity(chars.len());
    let mut idx = 0;
    while idx < chars.len() {
        let c = chars[idx];
        if let Some(&small) = chars.get(idx + 1) {
            if let Some(alts) = combine(c, small) {
                pieces.push(Piece::Syllable(alts));
                idx += 2;
                continue;
            }
        }
        let piece = match c {
            'っ' => Piece::Sokuon,
            'ー' => Piece::LongVowel,
            _ => syllable(c).map_or(Piece::Other(c), |alts| {
                Piece::Syllable(alts.iter().map(|s| (*s).to_string()).collect())
            }),
        };
        pieces.push(piece);
        idx += 1;
    }
    pieces
}

/// Base syllable followed by a small kana: きゃ, しょ, ふぁ, てぃ, うぇ ...
fn combine(base: char, small: char) -> Option<Vec<String>> {
    let vowel = match small {
        'ゃ' => "ya",
        'ゅ' => "yu",
        'ょ' => "yo",
        'ぁ' => "a",
        'ぃ' => "i",
        'ぅ' => "u",
        'ぇ' => "e",
        'ぉ' => "o",
        _ => return None,
    };
    let alts = syllable(base)?;
    let mut out = Vec::new();
    for alt in alts {
        let combined = if vowel.starts_with('y') {
            let stem = alt.strip_suffix('i')?;
            if stem.ends_with('h') || stem == "j" {
                format!("{stem}{}", &vowel[1..])
            } else {
                format!("{stem}{vowel}")
            }
        } else if base == 'う' {
            format!("w{vowel}")
        } else {
            let stem = alt.strip_suffix(|c: char| is_vowel(c)).unwrap_or(alt);
            format!("{stem}{vowel}")
        };
        if !out.contains(&combined) {
            out.push(combined);
        }
    }
    Some(out)
}

fn syllable(c: char) -> Option<&'static [&'static str]> {
    let alts: &'static [&'static str] = match c {
        'あ' | 'ぁ' => &["a"],
        'い' | 'ぃ' | 'ゐ' => &["i"],
        'う' | 'ぅ' => &["u"],
        'え' | 'ぇ' | 'ゑ' => &["e"],
        'お' | 'ぉ' => &["o"],
        'か' => &["ka"],
        'き' => &["ki"],
        'く' => &["ku"],
        'け' => &["ke"],
        'こ' => &["ko"],
        'が' => &["ga"],
        'ぎ' => &["gi"],
        'ぐ' => &["gu"],
        'げ' => &["ge"],
        'ご' => &["go"],
        'さ' => &["sa"],
        'し' => &["shi", "si"],
        'す' => &["su"],
        'せ' => &["se"],
        'そ' => &["so"],
        'ざ' => &["za"],
        'じ' => &["ji", "zi"],
        'ず' => &["zu"],
        'ぜ' => &["ze"],
        'ぞ' => &["zo"],
        'た' => &["ta"],
        'ち' => &["chi", "ti"],
        'つ' => &["tsu", "tu"],
        'て' => &["te"],
        'と' => &["to"],
        'だ' => &["da"],
        'ぢ' => &["ji", "di"],
        'づ' => &["zu", "du"],
        'で' => &["de"],
        'ど' => &["do"],
        'な' => &["na"],
        'に' => &["ni"],
        'ぬ' => &["nu"],
        'ね' => &["ne"],
        'の' => &["no"],
        'は' => &["ha"],
        'ひ' => &["hi"],
        'ふ' => &["fu", "hu"],
        'へ' => &["he"],
        'ほ' => &["ho"],
        'ば' => &["ba"],
        'び' => &["bi"],
        'ぶ' => &["bu"],
        'べ' => &["be"],
        'ぼ' => &["bo"],
        'ぱ' => &["pa"],
        'ぴ' => &["pi"],
        'ぷ' => &["pu"],
        'ぺ' => &["pe"],
        'ぽ' => &["po"],
        'ま' => &["ma"],
        'み' => &["mi"],
        'む' => &["mu"],
        'め' => &["me"],
        'も' => &["mo"],
        'や' | 'ゃ' => &["ya"],
        'ゆ' | 'ゅ' => &["yu"],
        'よ' | 'ょ' => &["yo"],
        'ら' => &["ra"],
        'り' => &["ri"],
        'る' => &["ru"],
        'れ' => &["re"],
        'ろ' => &["ro"],
        'わ' | 'ゎ' => &["wa"],
        'を' => &["o", "wo"],
        'ん' => &["n"],
        'ゔ' => &["vu", "bu"],
        _ => return None,
    };
    Some(alts)
}
