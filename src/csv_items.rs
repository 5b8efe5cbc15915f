use crate::{BroadcasterType, NodeAttributes};
use serde::{de, Deserialize, Deserializer};

/// Row of a `musae_<COUNTRY>_target.csv` node table.
#[derive(Clone, Debug, Deserialize)]
pub struct TargetCsvEntry {
  pub new_id: u64,
  /// Twitch account id, only needed for api enrichment.
  #[serde(default)]
  pub id: Option<u64>,
  pub views: u64,
  #[serde(deserialize_with = "deserialize_flag")]
  pub partner: bool,
  #[serde(deserialize_with = "deserialize_flag")]
  pub mature: bool,
  pub days: u64,
  #[serde(default)]
  pub broadcaster_type: Option<BroadcasterType>,
  #[serde(default)]
  pub game_name: Option<String>,
}

impl TargetCsvEntry {
  pub fn attributes(self) -> (u64, NodeAttributes) {
    let TargetCsvEntry {
      new_id,
      views,
      partner,
      mature,
      days,
      broadcaster_type,
      game_name,
      ..
    } = self;

    (
      new_id,
      NodeAttributes {
        views,
        partner,
        mature,
        days,
        broadcaster_type: broadcaster_type.unwrap_or_default(),
        game_name: game_name.filter(|name| !name.trim().is_empty()),
      },
    )
  }
}

/// Row of a `musae_<COUNTRY>_edges.csv` edge table.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct EdgeCsvEntry {
  pub from: u64,
  pub to: u64,
}

/// `True`/`False` (pandas) and `1`/`0` (after `astype(int)`) both show up in
/// the exported tables.
pub fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "1.0" => Some(true),
    "false" | "0" | "0.0" => Some(false),
    _ => None,
  }
}

pub fn deserialize_flag<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<bool, D::Error> {
  let raw = String::deserialize(deserializer)?;
  parse_flag(&raw).ok_or_else(|| {
    de::Error::custom(format!("invalid boolean value \"{}\"", raw))
  })
}

pub fn deserialize_optional_flag<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<bool>, D::Error> {
  match Option::<String>::deserialize(deserializer)? {
    None => Ok(None),
    Some(raw) if raw.trim().is_empty() => Ok(None),
    Some(raw) => parse_flag(&raw).map(Some).ok_or_else(|| {
      de::Error::custom(format!("invalid boolean value \"{}\"", raw))
    }),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn read_targets(data: &str) -> csv::Result<Vec<TargetCsvEntry>> {
    csv::Reader::from_reader(data.as_bytes())
      .deserialize()
      .collect()
  }

  #[test]
  fn flags() {
    assert_eq!(parse_flag("True"), Some(true));
    assert_eq!(parse_flag("false"), Some(false));
    assert_eq!(parse_flag(" 1 "), Some(true));
    assert_eq!(parse_flag("0"), Some(false));
    assert_eq!(parse_flag("yes"), None);
  }

  #[test]
  fn original_musae_columns() {
    let entries = read_targets(
      "id,days,mature,views,partner,new_id\n\
       73045350,1459,False,9528,False,2299\n\
       61573865,1629,True,3615,False,153\n",
    )
    .unwrap();

    assert_eq!(entries.len(), 2);
    let (id, attributes) = entries[1].clone().attributes();
    assert_eq!(id, 153);
    assert_eq!(attributes.views, 3615);
    assert!(attributes.mature);
    assert!(!attributes.partner);
    assert_eq!(attributes.days, 1629);
    assert_eq!(attributes.broadcaster_type, BroadcasterType::NonStreamer);
    assert_eq!(attributes.game_name, None);
  }

  #[test]
  fn enriched_columns() {
    let entries = read_targets(
      "new_id,views,partner,mature,days,broadcaster_type,game_name\n\
       0,100,1,0,10,affiliate,Just Chatting\n\
       1,5,0,1,20,account_Deleted,\n\
       2,7,0,0,30,,\n",
    )
    .unwrap();

    let attributes: Vec<_> =
      entries.into_iter().map(|e| e.attributes().1).collect();
    assert_eq!(attributes[0].broadcaster_type, BroadcasterType::Affiliate);
    assert!(attributes[0].partner);
    assert_eq!(attributes[0].game_name.as_deref(), Some("Just Chatting"));
    assert_eq!(
      attributes[1].broadcaster_type,
      BroadcasterType::AccountDeleted
    );
    assert_eq!(attributes[1].game_name, None);
    assert_eq!(attributes[2].broadcaster_type, BroadcasterType::NonStreamer);
  }

  #[test]
  fn missing_required_column() {
    assert!(read_targets("new_id,views\n1,2\n").is_err());
  }

  #[test]
  fn bad_flag() {
    assert!(read_targets(
      "new_id,views,partner,mature,days\n1,2,maybe,False,3\n"
    )
    .is_err());
  }
}
