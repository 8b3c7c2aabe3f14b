//! Visual attributes derived from work item type and state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Iteration, WorkItem, WorkItemState, WorkItemType};

/// Node shapes understood by the render host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Ball,
    Box,
    Tetra,
    Cylinder,
    Diamond,
    Hourglass,
    Plus,
    Star,
    Flat,
}

/// Node and link colours, serialized as the hex strings the host expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "FFFFFF")]
    White,
    #[serde(rename = "FF0000")]
    Red,
    #[serde(rename = "0066FF")]
    DarkBlue,
    #[serde(rename = "00CC00")]
    Green,
    #[serde(rename = "BFBFBF")]
    LightGray,
    #[serde(rename = "4D4D4D")]
    DarkGray,
    #[serde(rename = "bfffff")]
    LightCyan,
}

impl Color {
    pub fn as_hex(&self) -> &'static str {
        match self {
            Self::White => "FFFFFF",
            Self::Red => "FF0000",
            Self::DarkBlue => "0066FF",
            Self::Green => "00CC00",
            Self::LightGray => "BFBFBF",
            Self::DarkGray => "4D4D4D",
            Self::LightCyan => "bfffff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkShape {
    Solid,
    Dash,
    Arrows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTrail {
    None,
    Cone,
    Ball,
    Ring,
}

pub fn map_shape(kind: WorkItemType) -> Shape {
    match kind {
        WorkItemType::Program => Shape::Flat,
        WorkItemType::Epic => Shape::Plus,
        WorkItemType::Feature => Shape::Tetra,
        WorkItemType::Story => Shape::Diamond,
        WorkItemType::Task => Shape::Box,
        WorkItemType::Bug => Shape::Star,
        WorkItemType::Issue => Shape::Hourglass,
        WorkItemType::Unknown => Shape::Ball,
    }
}

/// Status colour of a work item.
///
/// Issues and bugs carry their own palettes; every other type shares the general one.
pub fn map_color(kind: WorkItemType, state: WorkItemState) -> Color {
    match kind {
        WorkItemType::Issue => match state {
            WorkItemState::InProgress => Color::Red,
            WorkItemState::Completed => Color::DarkBlue,
            _ => Color::Red,
        },
        WorkItemType::Bug => match state {
            WorkItemState::Backlog => Color::Red,
            WorkItemState::InProgress => Color::LightCyan,
            WorkItemState::Completed => Color::DarkBlue,
            _ => Color::Red,
        },
        _ => match state {
            WorkItemState::Backlog => Color::LightGray,
            WorkItemState::InProgress => Color::Green,
            WorkItemState::Completed => Color::DarkBlue,
            WorkItemState::Removed => Color::DarkGray,
            WorkItemState::Unknown => Color::White,
        },
    }
}

/// Visual style of a parent → child link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStyle {
    pub color: Color,
    pub shape: LinkShape,
    pub trail: LinkTrail,
    pub size: f64,
}

/// Derive a link's style from the child it points at.
///
/// Links into a child with no active work (light gray) stay thin and plain;
/// every other link is drawn as a thicker arrow.
pub fn link_style(child: &WorkItem) -> LinkStyle {
    let color = map_color(child.kind, child.state);
    if color == Color::LightGray {
        LinkStyle {
            color,
            shape: LinkShape::Solid,
            trail: LinkTrail::None,
            size: 1.0,
        }
    } else {
        LinkStyle {
            color,
            shape: LinkShape::Arrows,
            trail: LinkTrail::Cone,
            size: 2.0,
        }
    }
}

/// Format an iteration date as `MM/DD`.
pub fn format_iteration_date(date: &DateTime<Utc>) -> String {
    date.format("%m/%d").to_string()
}

/// How link labels render a child's iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterationLabelMode {
    /// The iteration name, unchanged.
    #[default]
    Name,
    /// The iteration's start date as `MM/DD`, falling back to the name when unknown.
    StartDate,
}

impl std::str::FromStr for IterationLabelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "start-date" => Ok(Self::StartDate),
            other => Err(format!(
                "Invalid iteration label mode '{}'. Must be: name or start-date",
                other
            )),
        }
    }
}

/// Turns iteration names into link labels using the loaded iteration catalog.
#[derive(Debug, Clone, Default)]
pub struct IterationLabels {
    mode: IterationLabelMode,
    catalog: HashMap<String, Iteration>,
}

impl IterationLabels {
    pub fn new(mode: IterationLabelMode) -> Self {
        Self {
            mode,
            catalog: HashMap::new(),
        }
    }

    pub fn with_catalog(mode: IterationLabelMode, iterations: &[Iteration]) -> Self {
        Self {
            mode,
            catalog: iterations
                .iter()
                .map(|it| (it.name.clone(), it.clone()))
                .collect(),
        }
    }

    pub fn label(&self, iteration: Option<&str>) -> String {
        let Some(name) = iteration else {
            return String::new();
        };
        match self.mode {
            IterationLabelMode::Name => name.to_string(),
            IterationLabelMode::StartDate => self
                .catalog
                .get(name)
                .and_then(|it| it.start.as_ref())
                .map(format_iteration_date)
                .unwrap_or_else(|| name.to_string()),
        }
    }
}
