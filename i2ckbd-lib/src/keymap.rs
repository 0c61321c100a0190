//! Character to key sequence tables.
//!
//! A character is typed by pressing its key strokes in order and releasing
//! everything afterwards. Dead-key accents need a release in the middle of the
//! sequence (`ê` is `^`, release, `e`), which is what [`KeyStroke::ReleaseAll`]
//! is for.

use crate::error::KbdError;
use crate::frame::KeyId;
use crate::keycodes::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "StrokeRepr")]
pub enum KeyStroke {
    /// Press a key and keep it pressed
    Key(KeyId),
    /// Release every pressed key before continuing
    ReleaseAll,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrokeRepr {
    Key(u8),
    Named(String),
}

impl TryFrom<StrokeRepr> for KeyStroke {
    type Error = KbdError;

    fn try_from(repr: StrokeRepr) -> Result<Self, Self::Error> {
        match repr {
            StrokeRepr::Key(id) => Ok(KeyStroke::Key(KeyId(id))),
            StrokeRepr::Named(name) if name == "release_all" => Ok(KeyStroke::ReleaseAll),
            StrokeRepr::Named(name) => Err(KbdError::InvalidKeyStroke(name)),
        }
    }
}

/// Lookup table from characters to key sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMap {
    entries: HashMap<char, Vec<KeyStroke>>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// German keyboard layout, as configured on the receiving host.
    pub fn german() -> Self {
        GERMAN
            .iter()
            .map(|(c, strokes)| (*c, strokes.to_vec()))
            .collect()
    }

    /// Parse a JSON object mapping single characters to stroke lists, e.g.
    /// `{"a": [30], "ê": [41, "release_all", 18]}`.
    pub fn from_json(json: &str) -> Result<Self, KbdError> {
        let raw: HashMap<String, Vec<KeyStroke>> = serde_json::from_str(json)?;
        let mut map = KeyMap::new();
        for (key, strokes) in raw {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => map.insert(c, strokes),
                _ => {
                    return Err(KbdError::InvalidKeyStroke(format!(
                        "key map entry {:?} is not a single character",
                        key
                    )));
                }
            }
        }
        Ok(map)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KbdError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, c: char, strokes: Vec<KeyStroke>) {
        self.entries.insert(c, strokes);
    }

    pub fn get(&self, c: char) -> Option<&[KeyStroke]> {
        self.entries.get(&c).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by character, so repeated runs type in the same order.
    pub fn entries(&self) -> Vec<(char, &[KeyStroke])> {
        let mut entries: Vec<_> = self.entries.iter().map(|(c, s)| (*c, s.as_slice())).collect();
        entries.sort_by_key(|(c, _)| *c);
        entries
    }
}

impl FromIterator<(char, Vec<KeyStroke>)> for KeyMap {
    fn from_iter<I: IntoIterator<Item = (char, Vec<KeyStroke>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

const fn k(id: KeyId) -> KeyStroke {
    KeyStroke::Key(id)
}

const SHIFT: KeyStroke = k(KEY_RIGHTSHIFT);
const ALTGR: KeyStroke = k(KEY_RIGHTALT);
const REL: KeyStroke = KeyStroke::ReleaseAll;

#[rustfmt::skip]
const GERMAN: &[(char, &[KeyStroke])] = &[
    ('\n', &[k(KEY_ENTER)]),
    ('a', &[k(KEY_A)]),
    ('b', &[k(KEY_B)]),
    ('c', &[k(KEY_C)]),
    ('d', &[k(KEY_D)]),
    ('e', &[k(KEY_E)]),
    ('f', &[k(KEY_F)]),
    ('g', &[k(KEY_G)]),
    ('h', &[k(KEY_H)]),
    ('i', &[k(KEY_I)]),
    ('j', &[k(KEY_J)]),
    ('k', &[k(KEY_K)]),
    ('l', &[k(KEY_L)]),
    ('m', &[k(KEY_M)]),
    ('n', &[k(KEY_N)]),
    ('o', &[k(KEY_O)]),
    ('p', &[k(KEY_P)]),
    ('q', &[k(KEY_Q)]),
    ('r', &[k(KEY_R)]),
    ('s', &[k(KEY_S)]),
    ('t', &[k(KEY_T)]),
    ('u', &[k(KEY_U)]),
    ('v', &[k(KEY_V)]),
    ('w', &[k(KEY_W)]),
    ('x', &[k(KEY_X)]),
    ('y', &[k(KEY_Z)]),
    ('z', &[k(KEY_Y)]),
    ('A', &[SHIFT, k(KEY_A)]),
    ('B', &[SHIFT, k(KEY_B)]),
    ('C', &[SHIFT, k(KEY_C)]),
    ('D', &[SHIFT, k(KEY_D)]),
    ('E', &[SHIFT, k(KEY_E)]),
    ('F', &[SHIFT, k(KEY_F)]),
    ('G', &[SHIFT, k(KEY_G)]),
    ('H', &[SHIFT, k(KEY_H)]),
    ('I', &[SHIFT, k(KEY_I)]),
    ('J', &[SHIFT, k(KEY_J)]),
    ('K', &[SHIFT, k(KEY_K)]),
    ('L', &[SHIFT, k(KEY_L)]),
    ('M', &[SHIFT, k(KEY_M)]),
    ('N', &[SHIFT, k(KEY_N)]),
    ('O', &[SHIFT, k(KEY_O)]),
    ('P', &[SHIFT, k(KEY_P)]),
    ('Q', &[SHIFT, k(KEY_Q)]),
    ('R', &[SHIFT, k(KEY_R)]),
    ('S', &[SHIFT, k(KEY_S)]),
    ('T', &[SHIFT, k(KEY_T)]),
    ('U', &[SHIFT, k(KEY_U)]),
    ('V', &[SHIFT, k(KEY_V)]),
    ('W', &[SHIFT, k(KEY_W)]),
    ('X', &[SHIFT, k(KEY_X)]),
    ('Y', &[SHIFT, k(KEY_Z)]),
    ('Z', &[SHIFT, k(KEY_Y)]),
    ('ü', &[k(KEY_LEFTBRACE)]),
    ('ö', &[k(KEY_SEMICOLON)]),
    ('ä', &[k(KEY_APOSTROPHE)]),
    ('Ü', &[SHIFT, k(KEY_LEFTBRACE)]),
    ('Ö', &[SHIFT, k(KEY_SEMICOLON)]),
    ('Ä', &[SHIFT, k(KEY_APOSTROPHE)]),
    ('1', &[k(KEY_1)]),
    ('2', &[k(KEY_2)]),
    ('3', &[k(KEY_3)]),
    ('4', &[k(KEY_4)]),
    ('5', &[k(KEY_5)]),
    ('6', &[k(KEY_6)]),
    ('7', &[k(KEY_7)]),
    ('8', &[k(KEY_8)]),
    ('9', &[k(KEY_9)]),
    ('0', &[k(KEY_0)]),
    ('!', &[SHIFT, k(KEY_1)]),
    ('"', &[SHIFT, k(KEY_2)]),
    ('§', &[SHIFT, k(KEY_3)]),
    ('$', &[SHIFT, k(KEY_4)]),
    ('%', &[SHIFT, k(KEY_5)]),
    ('&', &[SHIFT, k(KEY_6)]),
    ('/', &[SHIFT, k(KEY_7)]),
    ('(', &[SHIFT, k(KEY_8)]),
    (')', &[SHIFT, k(KEY_9)]),
    ('=', &[SHIFT, k(KEY_0)]),
    ('¹', &[ALTGR, k(KEY_1)]),
    ('²', &[ALTGR, k(KEY_2)]),
    ('³', &[ALTGR, k(KEY_3)]),
    ('¼', &[ALTGR, k(KEY_4)]),
    ('½', &[ALTGR, k(KEY_5)]),
    ('{', &[ALTGR, k(KEY_7)]),
    ('[', &[ALTGR, k(KEY_8)]),
    (']', &[ALTGR, k(KEY_9)]),
    ('}', &[ALTGR, k(KEY_0)]),
    ('€', &[ALTGR, k(KEY_E)]),
    ('µ', &[ALTGR, k(KEY_M)]),
    ('@', &[ALTGR, k(KEY_Q)]),
    ('«', &[ALTGR, k(KEY_X)]),
    ('»', &[ALTGR, k(KEY_Z)]),
    ('„', &[ALTGR, k(KEY_V)]),
    ('“', &[ALTGR, k(KEY_B)]),
    ('”', &[ALTGR, k(KEY_N)]),
    ('·', &[ALTGR, k(KEY_COMMA)]),
    ('…', &[ALTGR, k(KEY_DOT)]),
    (',', &[k(KEY_COMMA)]),
    (';', &[SHIFT, k(KEY_COMMA)]),
    ('.', &[k(KEY_DOT)]),
    (':', &[SHIFT, k(KEY_DOT)]),
    ('-', &[k(KEY_SLASH)]),
    ('_', &[SHIFT, k(KEY_SLASH)]),
    ('<', &[k(KEY_102ND)]),
    ('>', &[SHIFT, k(KEY_102ND)]),
    ('|', &[ALTGR, k(KEY_102ND)]),
    ('ß', &[k(KEY_MINUS)]),
    ('?', &[SHIFT, k(KEY_MINUS)]),
    ('\\', &[ALTGR, k(KEY_MINUS)]),
    ('`', &[SHIFT, k(KEY_EQUAL), k(KEY_SPACE)]),
    ('+', &[k(KEY_RIGHTBRACE)]),
    ('*', &[SHIFT, k(KEY_RIGHTBRACE)]),
    ('~', &[ALTGR, k(KEY_RIGHTBRACE)]),
    ('#', &[k(KEY_BACKSLASH)]),
    ('\'', &[SHIFT, k(KEY_BACKSLASH)]),
    ('^', &[k(KEY_GRAVE), k(KEY_SPACE)]),
    ('°', &[SHIFT, k(KEY_GRAVE)]),
    (' ', &[k(KEY_SPACE)]),
    ('ê', &[k(KEY_GRAVE), REL, k(KEY_E)]),
    ('é', &[k(KEY_EQUAL), REL, k(KEY_E)]),
    ('è', &[SHIFT, k(KEY_EQUAL), REL, k(KEY_E)]),
    ('ô', &[k(KEY_GRAVE), REL, k(KEY_O)]),
    ('ó', &[k(KEY_EQUAL), REL, k(KEY_O)]),
    ('ò', &[SHIFT, k(KEY_EQUAL), REL, k(KEY_O)]),
    ('â', &[k(KEY_GRAVE), REL, k(KEY_A)]),
    ('á', &[k(KEY_EQUAL), REL, k(KEY_A)]),
    ('à', &[SHIFT, k(KEY_EQUAL), REL, k(KEY_A)]),
    ('î', &[k(KEY_GRAVE), REL, k(KEY_I)]),
    ('í', &[k(KEY_EQUAL), REL, k(KEY_I)]),
    ('ì', &[SHIFT, k(KEY_EQUAL), REL, k(KEY_I)]),
    ('û', &[k(KEY_GRAVE), REL, k(KEY_U)]),
    ('ú', &[k(KEY_EQUAL), REL, k(KEY_U)]),
    ('ù', &[SHIFT, k(KEY_EQUAL), REL, k(KEY_U)]),
    ('Ê', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_E)]),
    ('É', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_E)]),
    ('È', &[SHIFT, k(KEY_EQUAL), REL, SHIFT, k(KEY_E)]),
    ('Ô', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_O)]),
    ('Ó', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_O)]),
    ('Ò', &[SHIFT, k(KEY_EQUAL), REL, SHIFT, k(KEY_O)]),
    ('Î', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_I)]),
    ('Í', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_I)]),
    ('Ì', &[SHIFT, k(KEY_EQUAL), REL, SHIFT, k(KEY_I)]),
    ('Û', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_U)]),
    ('Ú', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_U)]),
    ('Ù', &[SHIFT, k(KEY_EQUAL), REL, SHIFT, k(KEY_U)]),
    ('Â', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_A)]),
    ('Á', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_A)]),
    ('À', &[SHIFT, k(KEY_EQUAL), REL, SHIFT, k(KEY_A)]),
    ('ẑ', &[k(KEY_GRAVE), REL, k(KEY_Y)]),
    ('Ẑ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_Y)]),
    ('ź', &[k(KEY_EQUAL), REL, k(KEY_Y)]),
    ('Ź', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_Y)]),
    ('ĉ', &[k(KEY_GRAVE), REL, k(KEY_C)]),
    ('Ĉ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_C)]),
    ('ć', &[k(KEY_EQUAL), REL, k(KEY_C)]),
    ('Ć', &[k(KEY_EQUAL), REL, SHIFT, k(KEY_C)]),
    ('ŝ', &[k(KEY_GRAVE), REL, k(KEY_S)]),
    ('Ŝ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_S)]),
    ('ĵ', &[k(KEY_GRAVE), REL, k(KEY_J)]),
    ('Ĵ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_J)]),
    ('ĥ', &[k(KEY_GRAVE), REL, k(KEY_H)]),
    ('Ĥ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_H)]),
    ('ĝ', &[k(KEY_GRAVE), REL, k(KEY_G)]),
    ('Ĝ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_G)]),
    ('ŷ', &[k(KEY_GRAVE), REL, k(KEY_Z)]),
    ('Ŷ', &[k(KEY_GRAVE), REL, SHIFT, k(KEY_Z)]),
];
