use plotters::style::RGBColor;

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Project {
    /// Identifier as written by the benchmark harness, ie. `cheerpj`
    pub id: &'static str,
    /// Name shown on the charts
    pub name: &'static str,
    pub colour: RGBColor,
}

pub const PROJECTS: &[Project] = &[
    Project {
        id: "cheerpj",
        name: "CheerpJ",
        colour: RGBColor(0xef, 0x82, 0x32),
    },
    Project {
        id: "gwt",
        name: "GWT",
        colour: RGBColor(0xe5, 0x48, 0x40),
    },
    Project {
        id: "handwritten",
        name: "Handwritten WASM",
        colour: RGBColor(0x60, 0x56, 0xe7),
    },
    Project {
        id: "javascript",
        name: "Handwritten JavaScript",
        colour: RGBColor(0xe5, 0xd3, 0x65),
    },
    Project {
        id: "jvm",
        name: "JVM",
        colour: RGBColor(0x5c, 0x82, 0xa0),
    },
    Project {
        id: "jwebassembly",
        name: "JWebAssembly",
        colour: RGBColor(0x20, 0x53, 0x85),
    },
    Project {
        id: "montera",
        name: "My Project",
        colour: RGBColor(0xec, 0x40, 0x7a),
    },
    Project {
        id: "monteraopt",
        name: "My Project (Optimised)",
        colour: RGBColor(0xec, 0x40, 0x7a),
    },
    Project {
        id: "teavm",
        name: "TeaVM",
        colour: RGBColor(0x00, 0xa5, 0x2b),
    },
];

pub fn by_id(id: &str) -> Option<&'static Project> {
    PROJECTS.iter().find(|p| p.id == id)
}

/// Display name for `id`, unknown identifiers are passed through unchanged
pub fn display_name(id: &str) -> &str {
    by_id(id).map_or(id, |p| p.name)
}

pub fn colour(name: &str) -> Result<RGBColor, ReportError> {
    PROJECTS
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.colour)
        .ok_or_else(|| ReportError::UnknownProject(name.to_owned()))
}
