//! INI settings: `key=value` lines with one level of `[section]` blocks.
//!
//! The root must be a record. Its scalar and enum fields are written first
//! as `key=value`; every nested record field then becomes a `[key]`
//! section holding that record's leaves. A record nested inside a section
//! cannot be expressed and is rejected, as are sequences and buffers.

use std::fmt::Write as _;

use super::{Serializer, Structurer};
use crate::schema::{enum_key, Field, FieldMut, FieldRef, Record};
use crate::util::{Error, Result};

const FORMAT: &str = "INI";

/// What a field becomes in INI output.
enum Entry<'a> {
    Leaf(String),
    Section(&'a dyn Record),
    Absent,
}

fn classify(field: &dyn Field) -> Result<Entry<'_>> {
    match field.view() {
        FieldRef::Scalar(leaf) => {
            let text = leaf.to_string();
            if text.contains(['\n', '\r']) {
                return Err(Error::unsupported(FORMAT, "multi-line value"));
            }
            Ok(Entry::Leaf(text))
        }
        FieldRef::Enum(e) => Ok(Entry::Leaf(enum_key(e)?.to_string())),
        FieldRef::Record(record) => Ok(Entry::Section(record)),
        FieldRef::Optional(opt) => match opt.get() {
            Some(inner) => classify(inner),
            None => Ok(Entry::Absent),
        },
        other => Err(Error::unsupported(FORMAT, other.kind())),
    }
}

/// Encodes a record as INI text.
#[derive(Debug, Default)]
pub struct IniSerializer {
    out: String,
}

impl IniSerializer {
    /// Create a serializer.
    pub fn new() -> Self {
        Self::default()
    }

    fn leaf(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.out, "{}={}", key, value);
    }
}

impl Serializer for IniSerializer {
    type Output = String;

    fn write(mut self, source: &dyn Field) -> Result<String> {
        let FieldRef::Record(root) = source.view() else {
            return Err(Error::unsupported(FORMAT, "non-record root"));
        };

        let mut sections = Vec::new();
        for i in 0..root.field_count() {
            match classify(root.field(i))? {
                Entry::Leaf(value) => self.leaf(root.key(i), &value),
                Entry::Section(record) => sections.push((root.key(i), record)),
                Entry::Absent => {}
            }
        }

        for (name, record) in sections {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            let _ = writeln!(self.out, "[{}]", name);
            for i in 0..record.field_count() {
                match classify(record.field(i))? {
                    Entry::Leaf(value) => self.leaf(record.key(i), &value),
                    Entry::Section(_) => {
                        return Err(Error::IniNesting {
                            section: name.to_string(),
                            field: record.key(i).to_string(),
                        })
                    }
                    Entry::Absent => {}
                }
            }
        }
        Ok(self.out)
    }
}

/// Decodes INI text into a record.
///
/// `;` and `#` start comment lines. Keys and sections the destination
/// does not know are skipped.
#[derive(Debug)]
pub struct IniStructurer<'a> {
    text: &'a str,
}

impl<'a> IniStructurer<'a> {
    /// Create a structurer over `text`.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

/// Where `key=value` lines currently land.
#[derive(Clone, Copy)]
enum Target {
    Root,
    Section(usize),
    Skip,
}

impl IniStructurer<'_> {
    /// Decode in place; fields read before a failure stay written.
    fn decode(self, target: &mut dyn Field) -> Result<()> {
        let FieldMut::Record(root) = target.view_mut() else {
            return Err(Error::unsupported(FORMAT, "non-record root"));
        };

        let mut current = Target::Root;
        let mut offset = 0;
        for raw in self.text.split('\n') {
            let line_start = offset;
            offset += raw.len() + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            let syntax = |message: String| Error::Syntax {
                offset: line_start,
                message,
            };

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| syntax(format!("unterminated section header {:?}", line)))?
                    .trim();
                current = match root.find(name) {
                    Some(i) if open_section(root.field_mut(i)) => Target::Section(i),
                    _ => {
                        tracing::trace!(record = root.record_name(), section = name, "skipping unknown section");
                        Target::Skip
                    }
                };
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| syntax(format!("expected key=value, found {:?}", line)))?;
            let (key, value) = (key.trim(), value.trim());

            let record: &mut dyn Record = match current {
                Target::Root => &mut *root,
                Target::Section(i) => match section_mut(root.field_mut(i)) {
                    Some(section) => section,
                    None => continue,
                },
                Target::Skip => continue,
            };
            match record.find(key) {
                Some(i) => assign(record.field_mut(i), value).map_err(|e| match e {
                    Error::TypeMismatch { expected, actual } => {
                        syntax(format!("{}: expected {}, found {}", key, expected, actual))
                    }
                    e => e,
                })?,
                None => tracing::trace!(record = record.record_name(), key, "skipping unknown key"),
            }
        }
        Ok(())
    }
}

impl Structurer for IniStructurer<'_> {
    fn read_value<T: Field + Default>(self) -> Result<T> {
        let mut value = T::default();
        self.decode(&mut value)?;
        Ok(value)
    }
}

/// Prepare `field` to receive a `[section]`: records as they are, absent
/// optional records filled with a default. False when `field` cannot hold
/// a section.
fn open_section(field: &mut dyn Field) -> bool {
    match field.view_mut() {
        FieldMut::Record(_) => true,
        FieldMut::Optional(opt) => {
            if opt.get().is_none() {
                let is_record = matches!(opt.insert_default().view(), FieldRef::Record(_));
                if !is_record {
                    opt.clear();
                }
                is_record
            } else {
                matches!(opt.get().map(|f| f.view()), Some(FieldRef::Record(_)))
            }
        }
        _ => false,
    }
}

fn section_mut(field: &mut dyn Field) -> Option<&mut dyn Record> {
    match field.view_mut() {
        FieldMut::Record(section) => Some(section),
        FieldMut::Optional(opt) => match opt.get_mut()?.view_mut() {
            FieldMut::Record(section) => Some(section),
            _ => None,
        },
        _ => None,
    }
}

fn assign(field: &mut dyn Field, value: &str) -> Result<()> {
    match field.view_mut() {
        FieldMut::Scalar(mut leaf) => leaf.parse_text(value),
        FieldMut::Enum(e) => e.set_key(value),
        FieldMut::Optional(opt) => assign(opt.insert_default(), value),
        other => Err(Error::unsupported(FORMAT, other.kind())),
    }
}

/// Encode a record as INI text.
pub fn to_string(source: &dyn Field) -> Result<String> {
    IniSerializer::new().write(source)
}

/// Decode INI text into a fresh record.
pub fn from_str<T: Field + Default>(text: &str) -> Result<T> {
    IniStructurer::new(text).read_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enum_schema, schema};

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    enum Vsync {
        #[default]
        Off,
        On,
        Adaptive,
    }

    enum_schema!(Vsync { Off => "off", On => "on", Adaptive => "adaptive" });

    #[derive(Debug, Default, PartialEq)]
    struct Video {
        width: u32,
        height: u32,
        vsync: Vsync,
    }

    schema!(Video { width, height, vsync });

    #[derive(Debug, Default, PartialEq)]
    struct Audio {
        volume: f32,
        device: Option<String>,
    }

    schema!(Audio { volume, device });

    #[derive(Debug, Default, PartialEq)]
    struct Settings {
        player: String,
        video: Video,
        audio: Audio,
        fov: f32,
    }

    schema!(Settings { player, video, audio, fov });

    #[derive(Debug, Default)]
    struct Deep {
        settings: Settings,
    }

    schema!(Deep { settings });

    #[derive(Debug, Default)]
    struct Listy {
        ids: Vec<u32>,
    }

    schema!(Listy { ids });

    fn sample() -> Settings {
        Settings {
            player: "ana".into(),
            video: Video {
                width: 1280,
                height: 720,
                vsync: Vsync::Adaptive,
            },
            audio: Audio {
                volume: 0.75,
                device: None,
            },
            fov: 90.0,
        }
    }

    #[test]
    fn test_layout() {
        let text = to_string(&sample()).unwrap();
        assert_eq!(
            text,
            "player=ana\nfov=90\n\n[video]\nwidth=1280\nheight=720\nvsync=adaptive\n\n[audio]\nvolume=0.75\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let s = sample();
        assert_eq!(from_str::<Settings>(&to_string(&s).unwrap()).unwrap(), s);
    }

    #[test]
    fn test_optional_sections_round_trip() {
        #[derive(Debug, Default, PartialEq)]
        struct Profile {
            name: String,
            graphics: Option<Video>,
            sound: Option<Audio>,
        }
        schema!(Profile { name, graphics, sound });

        let p = Profile {
            name: "laptop".into(),
            graphics: Some(Video {
                width: 800,
                height: 600,
                vsync: Vsync::On,
            }),
            sound: None,
        };
        let text = to_string(&p).unwrap();
        assert_eq!(text, "name=laptop\n\n[graphics]\nwidth=800\nheight=600\nvsync=on\n");
        assert_eq!(from_str::<Profile>(&text).unwrap(), p);

        let empty: Profile = from_str("[sound]\n").unwrap();
        assert_eq!(empty.sound, Some(Audio::default()));
        assert_eq!(empty.graphics, None);
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        let s = Settings {
            fov: -0.0,
            ..sample()
        };
        let text = to_string(&s).unwrap();
        assert!(text.contains("fov=-0\n"));
        assert!(from_str::<Settings>(&text).unwrap().fov.is_sign_negative());
    }

    #[test]
    fn test_failed_read_leaves_target() {
        let mut s = sample();
        let err = IniStructurer::new("player=bo\n[video]\nwidth=wide\n")
            .read(&mut s)
            .unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 18, .. }));
        assert_eq!(s, sample());
    }

    #[test]
    fn test_second_level_nesting_is_rejected() {
        let err = to_string(&Deep::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::IniNesting { ref section, ref field } if section == "settings" && field == "video"
        ));
    }

    #[test]
    fn test_sequences_are_unsupported() {
        let err = to_string(&Listy::default()).unwrap_err();
        assert!(matches!(err, Error::Unsupported { format: "INI", .. }));
    }

    #[test]
    fn test_comments_and_unknown_entries() {
        let text = "; generated\nplayer = bo\nbrightness=3\n\n[network]\nport=80\n\n# audio\n[audio]\ndevice=usb\n";
        let s: Settings = from_str(text).unwrap();
        assert_eq!(s.player, "bo");
        assert_eq!(s.audio.device.as_deref(), Some("usb"));
        assert_eq!(s.video, Video::default());
    }

    #[test]
    fn test_syntax_errors_carry_offset() {
        let err = from_str::<Settings>("player=x\n[video\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 9, .. }));

        let err = from_str::<Settings>("player=x\nfov\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 9, .. }));

        let err = from_str::<Settings>("fov=wide\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 0, .. }));
    }
}
