use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel content category derived from the streamed game.
#[derive(
  Hash, Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone, Serialize, Deserialize,
)]
pub enum GameType {
  Online,
  Offline,
  #[serde(rename = "Non-Videogame")]
  NonVideogame,
  /// no game recorded
  #[serde(rename = "No Content")]
  NoContent,
}

impl GameType {
  pub const ALL: [GameType; 4] = [
    GameType::Online,
    GameType::Offline,
    GameType::NonVideogame,
    GameType::NoContent,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::Online => "Online",
      Self::Offline => "Offline",
      Self::NonVideogame => "Non-Videogame",
      Self::NoContent => "No Content",
    }
  }

  /// Names are compared trimmed and lower-cased. Anything not known to be
  /// single player or a non game category counts as online.
  pub fn of(game_name: Option<&str>) -> Self {
    let name = match game_name.map(str::trim) {
      Some(name) if !name.is_empty() => name.to_lowercase(),
      _ => return Self::NoContent,
    };
    if OFFLINE_GAMES.contains(&name.as_str()) {
      Self::Offline
    } else if NON_VIDEOGAMES.contains(&name.as_str()) {
      Self::NonVideogame
    } else {
      Self::Online
    }
  }
}

impl fmt::Display for GameType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

const NON_VIDEOGAMES: &[&str] = &[
  "irl",
  "just chatting",
  "watch tv",
  "art",
  "music",
  "science & technology",
  "software and game development",
  "co-working & studying",
  "crypto",
  "politics",
  "talk shows & podcasts",
  "djs",
  "special events",
  "sports",
  "food & drink",
  "casino",
  "cooking",
  "poker",
  "virtual casino",
  "tabletop rpgs",
];

const OFFLINE_GAMES: &[&str] = &[
  "the callisto protocol",
  "kingdom two crowns",
  "my hotel",
  "disco elysium",
  "divinity: original sin ii",
  "grand theft auto: san andreas",
  "osu!",
  "the binding of isaac: repentance",
  "god of war ragnarök",
  "buckshot roulette",
  "atomic heart",
  "gothic ii",
  "grand theft auto iii",
  "silent hill 2",
  "ghostwire: tokyo",
  "dredge",
  "vladik brutal",
  "northern journey",
  "the dark pictures anthology: little hope",
  "marvel's spider-man",
  "resident evil 4",
  "crossout",
  "horizon zero dawn remastered",
  "outlast ii",
  "the last of us part i",
  "neva",
  "risk of rain 2",
  "elden ring",
  "alan wake ii",
  "dark souls ii: scholar of the first sin",
  "dark souls iii",
  "dark souls: remastered",
  "diablo ii",
  "fallout 4",
  "dungeon crusher: soul hunters",
  "castlevania: dawn of sorrow",
  "artifact",
  "i wanna kill the kamilia 3",
  "torchlight: infinite",
  "the guild 3",
  "sid meier's civilization vi",
  "sons of the forest",
  "the sims 4",
  "x4: foundations",
  "hades ii",
  "prince of persia: the lost crown",
  "bloodborne",
  "angry birds vr: isle of pigs",
  "heroes of might and magic v",
  "internet cafe simulator 2",
  "wolfenstein: the new order",
  "factorio",
  "doom eternal",
  "everlasting summer",
  "god hand",
  "beyond: two souls",
  "mafia iii",
  "zenless zone zero",
  "stardew valley",
  "sifu",
  "dead space 3",
  "mafia ii",
  "fallout 2",
  "snowrunner",
  "hollow knight",
  "the witcher 3: wild hunt",
  "killer instinct",
  "little misfortune",
  "magicraft",
  "planetbase",
  "microsoft flight simulator 2024",
  "songs of conquest",
  "stalker 2",
  "amnesia: rebirth",
  "napoleon: total war",
  "gran saga",
  "pokémon emerald version",
  "football, tactics & glory",
  "katamari damacy reroll",
  "lethal company",
  "vampire: the masquerade - bloodlines",
  "red dead redemption",
  "the walking dead",
  "detroit: become human",
  "until dawn",
  "dirt rally 2.0",
  "portal 2",
  "rise of the tomb raider",
  "half-life: alyx",
  "cyberpunk 2077",
  "forza horizon 5",
  "south park: the fractured but whole",
  "tsioque",
  "need for speed: most wanted",
  "infamous: second son",
  "marvel's spider-man remastered",
  "alone in the dark",
  "lobotomy corporation",
  "mortal kombat 1",
  "tropico 6",
  "dark and darker",
  "gray zone warfare",
  "the dark pictures anthology: man of medan",
  "beat saber",
  "blasphemous",
  "baldur's gate 3",
  "broken arrow",
  "yakuza 0",
  "dishonored",
  "hogwarts legacy",
  "grand theft auto iv",
  "need for speed: underground 2",
  "only up!",
  "dragon age: origins",
  "breathedge",
  "lucky tower ultimate",
  "prey",
  "euro truck simulator 2",
  "pathfinder: kingmaker",
  "empire of the ants",
  "the dark pictures anthology: the devil in me",
  "tiny bunny",
  "vintage story",
  "the surfer",
  "batman: the enemy within",
  "wolfenstein ii: the new colossus",
  "no man's sky",
  "cities: skylines",
  "valhall",
  "the witcher 2: assassins of kings",
  "amnesia: the dark descent",
  "hollow knight: silksong",
  "shadow of the colossus",
  "red dead redemption 2",
  "mass effect legendary edition",
  "sekiro: shadows die twice",
  "journey",
  "the elder scrolls iv: oblivion",
  "the elder scrolls iii: morrowind",
  "outer wilds",
  "the elder scrolls online",
  "the elder scrolls v: skyrim special edition",
  "nier: automata",
  "the witcher: enhanced edition",
  "the witcher 2: assassins of kings enhanced edition",
  "ori and the will of the wisps",
  "the witcher 3: wild hunt - game of the year edition",
  "control",
  "the witcher 3: wild hunt - blood and wine",
  "the witcher 3: wild hunt - hearts of stone",
  "metro exodus",
  "the legend of zelda: breath of the wild",
  "dead cells",
  "subnautica",
  "the elder scrolls v: skyrim",
];
