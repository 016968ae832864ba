//! Content types and the permitted parameter-set policy.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What kind of correction a GGXF model encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Cartesian2dOffsets")]
    Cartesian2dOffsets,
    #[serde(rename = "Cartesian3dOffsets")]
    Cartesian3dOffsets,
    #[serde(rename = "deformationModel")]
    DeformationModel,
    #[serde(rename = "deviationsOfTheVertical")]
    DeviationsOfTheVertical,
    #[serde(rename = "geocentricTranslations")]
    GeocentricTranslations,
    #[serde(rename = "geographic2dOffsets")]
    Geographic2dOffsets,
    #[serde(rename = "geographic3dOffsets")]
    Geographic3dOffsets,
    #[serde(rename = "geoidModel")]
    GeoidModel,
    #[serde(rename = "hydroidModel")]
    HydroidModel,
    #[serde(rename = "velocityModel")]
    VelocityModel,
    #[serde(rename = "verticalOffsets")]
    VerticalOffsets,
}

impl ContentType {
    pub const ALL: [ContentType; 11] = [
        ContentType::Cartesian2dOffsets,
        ContentType::Cartesian3dOffsets,
        ContentType::DeformationModel,
        ContentType::DeviationsOfTheVertical,
        ContentType::GeocentricTranslations,
        ContentType::Geographic2dOffsets,
        ContentType::Geographic3dOffsets,
        ContentType::GeoidModel,
        ContentType::HydroidModel,
        ContentType::VelocityModel,
        ContentType::VerticalOffsets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContentType::Cartesian2dOffsets => "Cartesian2dOffsets",
            ContentType::Cartesian3dOffsets => "Cartesian3dOffsets",
            ContentType::DeformationModel => "deformationModel",
            ContentType::DeviationsOfTheVertical => "deviationsOfTheVertical",
            ContentType::GeocentricTranslations => "geocentricTranslations",
            ContentType::Geographic2dOffsets => "geographic2dOffsets",
            ContentType::Geographic3dOffsets => "geographic3dOffsets",
            ContentType::GeoidModel => "geoidModel",
            ContentType::HydroidModel => "hydroidModel",
            ContentType::VelocityModel => "velocityModel",
            ContentType::VerticalOffsets => "verticalOffsets",
        }
    }

    /// Whether queries against this content require an epoch.
    pub fn needs_epoch(self) -> bool {
        matches!(self, ContentType::DeformationModel)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown GGXF content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

/// Source of the parameter combinations a group may supply.
///
/// Consulted once per group during configuration.
pub trait ParameterSetPolicy {
    /// Allowed parameter-name combinations for groups of `content`.
    fn permitted_sets(&self, content: ContentType) -> Vec<Vec<&str>>;

    /// Whether `names`, compared as a set, is one of the permitted combinations.
    fn permits(&self, content: ContentType, names: &[&str]) -> bool {
        let wanted: BTreeSet<&str> = names.iter().copied().collect();
        if wanted.len() != names.len() {
            return false;
        }
        self.permitted_sets(content)
            .into_iter()
            .any(|set| set.into_iter().collect::<BTreeSet<_>>() == wanted)
    }

    /// Parameter-set tag of a parameter name, if the policy knows it.
    fn parameter_set(&self, _content: ContentType, _name: &str) -> Option<&str> {
        None
    }
}

/// Accepts any combination of distinct parameter names.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyParameterSet;

impl ParameterSetPolicy for AnyParameterSet {
    fn permitted_sets(&self, _content: ContentType) -> Vec<Vec<&str>> {
        Vec::new()
    }

    fn permits(&self, _content: ContentType, names: &[&str]) -> bool {
        names.iter().collect::<BTreeSet<_>>().len() == names.len() && !names.is_empty()
    }
}

/// The parameter-set rules published with the GGXF format.
#[derive(Debug, Clone, Copy, Default)]
pub struct GgxfContentRules;

struct ContentRule {
    sets: &'static [&'static [&'static str]],
    tags: &'static [(&'static str, &'static str)],
}

const OFFSET: &str = "offset";
const OFFSET_UNCERTAINTY: &str = "offsetUncertainty";

const CARTESIAN_2D: ContentRule = ContentRule {
    sets: &[
        &["eastingOffset", "northingOffset"],
        &["eastingOffset", "northingOffset", "eastingOffsetUncertainty", "northingOffsetUncertainty"],
        &["westingOffset", "northingOffset"],
        &["westingOffset", "northingOffset", "westingOffsetUncertainty", "northingOffsetUncertainty"],
        &["eastingOffset", "southingOffset"],
        &["eastingOffset", "southingOffset", "eastingOffsetUncertainty", "southingOffsetUncertainty"],
        &["westingOffset", "southingOffset"],
        &["westingOffset", "southingOffset", "westingOffsetUncertainty", "southingOffsetUncertainty"],
    ],
    tags: &[
        ("eastingOffset", OFFSET),
        ("eastingOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("northingOffset", OFFSET),
        ("northingOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("southingOffset", OFFSET),
        ("southingOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("westingOffset", OFFSET),
        ("westingOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

macro_rules! horizontal_vertical_sets {
    ($($h:literal, $v:literal, $vertical:literal;)*) => {
        &[$(
            &[$h, $v, $vertical],
            &[
                $h, $v, $vertical,
                concat!($h, "Uncertainty"),
                concat!($v, "Uncertainty"),
                concat!($vertical, "Uncertainty"),
            ],
        )*]
    };
}

const CARTESIAN_3D: ContentRule = ContentRule {
    sets: horizontal_vertical_sets! {
        "eastingOffset", "northingOffset", "heightOffset";
        "westingOffset", "northingOffset", "heightOffset";
        "eastingOffset", "southingOffset", "heightOffset";
        "westingOffset", "southingOffset", "heightOffset";
        "eastingOffset", "northingOffset", "depthOffset";
        "westingOffset", "northingOffset", "depthOffset";
        "eastingOffset", "southingOffset", "depthOffset";
        "westingOffset", "southingOffset", "depthOffset";
    },
    tags: &[
        ("depthOffset", OFFSET),
        ("depthOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("eastingOffset", OFFSET),
        ("eastingOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("heightOffset", OFFSET),
        ("heightOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("northingOffset", OFFSET),
        ("northingOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("southingOffset", OFFSET),
        ("southingOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("westingOffset", OFFSET),
        ("westingOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

const GEOCENTRIC_TRANSLATIONS: ContentRule = ContentRule {
    sets: horizontal_vertical_sets! {
        "geocentricXOffset", "geocentricYOffset", "geocentricZOffset";
    },
    tags: &[
        ("geocentricXOffset", OFFSET),
        ("geocentricXOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("geocentricYOffset", OFFSET),
        ("geocentricYOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("geocentricZOffset", OFFSET),
        ("geocentricZOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

const GEOGRAPHIC_2D: ContentRule = ContentRule {
    sets: &[
        &["latitudeOffset", "longitudeOffset"],
        &["latitudeOffset", "longitudeOffset", "latitudeOffsetUncertainty", "longitudeOffsetUncertainty"],
    ],
    tags: &[
        ("latitudeOffset", OFFSET),
        ("latitudeOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("longitudeOffset", OFFSET),
        ("longitudeOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

const GEOGRAPHIC_3D: ContentRule = ContentRule {
    sets: horizontal_vertical_sets! {
        "latitudeOffset", "longitudeOffset", "ellipsoidalHeightOffset";
    },
    tags: &[
        ("ellipsoidalHeightOffset", OFFSET),
        ("ellipsoidalHeightOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("latitudeOffset", OFFSET),
        ("latitudeOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("longitudeOffset", OFFSET),
        ("longitudeOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

const VERTICAL_OFFSETS: ContentRule = ContentRule {
    sets: &[
        &["heightOffset"],
        &["heightOffset", "heightOffsetUncertainty"],
        &["depthOffset"],
        &["depthOffset", "depthOffsetUncertainty"],
    ],
    tags: &[
        ("depthOffset", OFFSET),
        ("depthOffsetUncertainty", OFFSET_UNCERTAINTY),
        ("heightOffset", OFFSET),
        ("heightOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

const GEOID_MODEL: ContentRule = ContentRule {
    sets: &[&["geoidHeight"], &["geoidHeight", "geoidHeightUncertainty"]],
    tags: &[
        ("geoidHeight", "geoidHeight"),
        ("geoidHeightUncertainty", "geoidHeightUncertainty"),
    ],
};

const DEVIATIONS_OF_THE_VERTICAL: ContentRule = ContentRule {
    sets: &[
        &["deviationEast", "deviationNorth"],
        &["deviationEast", "deviationNorth", "deviationEastUncertainty", "deviationNorthUncertainty"],
        &["deviationEastGeoid", "deviationNorthGeoid"],
        &[
            "deviationEastGeoid",
            "deviationNorthGeoid",
            "deviationEastGeoidUncertainty",
            "deviationNorthGeoidUncertainty",
        ],
    ],
    tags: &[
        ("deviationEast", "deviation"),
        ("deviationEastGeoid", "deviation"),
        ("deviationEastGeoidUncertainty", "deviationUncertainty"),
        ("deviationEastUncertainty", "deviationUncertainty"),
        ("deviationNorth", "deviation"),
        ("deviationNorthGeoid", "deviation"),
        ("deviationNorthGeoidUncertainty", "deviationUncertainty"),
        ("deviationNorthUncertainty", "deviationUncertainty"),
    ],
};

const HYDROID_MODEL: ContentRule = ContentRule {
    sets: &[&["heightOffset"], &["heightOffset", "heightOffsetUncertainty"]],
    tags: &[
        ("heightOffset", OFFSET),
        ("heightOffsetUncertainty", OFFSET_UNCERTAINTY),
    ],
};

const VELOCITY_MODEL: ContentRule = ContentRule {
    sets: &[
        &["velocityEast", "velocityNorth"],
        &["velocityEast", "velocityNorth", "velocityEastUncertainty", "velocityNorthUncertainty"],
        &["velocityEast", "velocityNorth", "velocityUp"],
        &[
            "velocityEast",
            "velocityNorth",
            "velocityUp",
            "velocityEastUncertainty",
            "velocityNorthUncertainty",
            "velocityUpUncertainty",
        ],
        &["velocityUp"],
        &["velocityUp", "velocityUpUncertainty"],
        &["velocityX", "velocityY", "velocityZ"],
        &[
            "velocityX",
            "velocityY",
            "velocityZ",
            "velocityXUncertainty",
            "velocityYUncertainty",
            "velocityZUncertainty",
        ],
    ],
    tags: &[
        ("velocityEast", "velocity"),
        ("velocityEastUncertainty", "velocityUncertainty"),
        ("velocityNorth", "velocity"),
        ("velocityNorthUncertainty", "velocityUncertainty"),
        ("velocityUp", "velocity"),
        ("velocityUpUncertainty", "velocityUncertainty"),
        ("velocityX", "velocity"),
        ("velocityXUncertainty", "velocityUncertainty"),
        ("velocityY", "velocity"),
        ("velocityYUncertainty", "velocityUncertainty"),
        ("velocityZ", "velocity"),
        ("velocityZUncertainty", "velocityUncertainty"),
    ],
};

const DEFORMATION_MODEL: ContentRule = ContentRule {
    sets: &[
        &["displacementEast", "displacementNorth", "displacementUp"],
        &[
            "displacementEast",
            "displacementNorth",
            "displacementUp",
            "horizontalDisplacementUncertainty",
            "verticalDisplacementUncertainty",
        ],
        &["displacementEast", "displacementNorth"],
        &["displacementEast", "displacementNorth", "horizontalDisplacementUncertainty"],
        &["displacementUp"],
        &["displacementUp", "verticalDisplacementUncertainty"],
    ],
    tags: &[
        ("displacementEast", "displacement"),
        ("displacementNorth", "displacement"),
        ("displacementUp", "displacement"),
        ("horizontalDisplacementUncertainty", "displacementUncertainty"),
        ("verticalDisplacementUncertainty", "displacementUncertainty"),
    ],
};

impl GgxfContentRules {
    fn rule(content: ContentType) -> &'static ContentRule {
        match content {
            ContentType::Cartesian2dOffsets => &CARTESIAN_2D,
            ContentType::Cartesian3dOffsets => &CARTESIAN_3D,
            ContentType::DeformationModel => &DEFORMATION_MODEL,
            ContentType::DeviationsOfTheVertical => &DEVIATIONS_OF_THE_VERTICAL,
            ContentType::GeocentricTranslations => &GEOCENTRIC_TRANSLATIONS,
            ContentType::Geographic2dOffsets => &GEOGRAPHIC_2D,
            ContentType::Geographic3dOffsets => &GEOGRAPHIC_3D,
            ContentType::GeoidModel => &GEOID_MODEL,
            ContentType::HydroidModel => &HYDROID_MODEL,
            ContentType::VelocityModel => &VELOCITY_MODEL,
            ContentType::VerticalOffsets => &VERTICAL_OFFSETS,
        }
    }
}

impl ParameterSetPolicy for GgxfContentRules {
    fn permitted_sets(&self, content: ContentType) -> Vec<Vec<&str>> {
        Self::rule(content)
            .sets
            .iter()
            .map(|set| set.to_vec())
            .collect()
    }

    fn parameter_set(&self, content: ContentType, name: &str) -> Option<&str> {
        Self::rule(content)
            .tags
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, tag)| *tag)
    }
}
