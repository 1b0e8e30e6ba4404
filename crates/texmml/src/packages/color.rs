//! `\color`, `\textcolor`, `\colorbox` and `\definecolor`.
//!
//! Colors are given in one of four models: `named` (the default), `rgb`
//! with components in `[0, 1]`, `RGB` with integer components in
//! `[0, 255]`, and `gray`. Everything but `named` is converted to a
//! `#RRGGBB` string.

use log::debug;

use crate::namespace::KeyMap;
use crate::node::{MmlNode, NodeKind};
use crate::parser::TexParser;
use crate::registry::{HandlerMap, MacroSpec, Package};
use crate::retry::ParseResult;
use crate::stack::{ItemKind, StackItem};
use crate::types::{ParseError, ParseErrorKind};

use super::EXTENSION_PRIORITY;
use super::base;

/// Registration name.
pub const NAME: &str = "color";

static COMMANDS: phf::Map<&'static str, MacroSpec> = phf::phf_map! {
    "color" => MacroSpec::new(color),
    "textcolor" => MacroSpec::new(text_color),
    "colorbox" => MacroSpec::new(color_box),
    "definecolor" => MacroSpec::new(define_color),
};

/// The dvips color names, as `#RRGGBB`.
static NAMED: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Apricot" => "#FBB982",
    "Aquamarine" => "#00B5BE",
    "Bittersweet" => "#C04F17",
    "Black" => "#221E1F",
    "Blue" => "#2D2F92",
    "BlueGreen" => "#00B3B8",
    "BlueViolet" => "#473992",
    "BrickRed" => "#B6321C",
    "Brown" => "#792500",
    "BurntOrange" => "#F7921D",
    "CadetBlue" => "#74729A",
    "CarnationPink" => "#F282B4",
    "Cerulean" => "#00A2E3",
    "CornflowerBlue" => "#41B0E4",
    "Cyan" => "#00AEEF",
    "Dandelion" => "#FDBC42",
    "DarkOrchid" => "#A4538A",
    "Emerald" => "#00A99D",
    "ForestGreen" => "#009B55",
    "Fuchsia" => "#8C368C",
    "Goldenrod" => "#FFDF42",
    "Gray" => "#949698",
    "Green" => "#00A64F",
    "GreenYellow" => "#DFE674",
    "JungleGreen" => "#00A99A",
    "Lavender" => "#F49EC4",
    "LimeGreen" => "#8DC73E",
    "Magenta" => "#EC008C",
    "Mahogany" => "#A9341F",
    "Maroon" => "#AF3235",
    "Melon" => "#F89E7B",
    "MidnightBlue" => "#006795",
    "Mulberry" => "#A93C93",
    "NavyBlue" => "#006EB8",
    "OliveGreen" => "#3C8031",
    "Orange" => "#F58137",
    "OrangeRed" => "#ED135A",
    "Orchid" => "#AF72B0",
    "Peach" => "#F7965A",
    "Periwinkle" => "#7977B8",
    "PineGreen" => "#008B72",
    "Plum" => "#92268F",
    "ProcessBlue" => "#00B0F0",
    "Purple" => "#99479B",
    "RawSienna" => "#974006",
    "Red" => "#ED1B23",
    "RedOrange" => "#F26035",
    "RedViolet" => "#A1246B",
    "Rhodamine" => "#EF559F",
    "RoyalBlue" => "#0071BC",
    "RoyalPurple" => "#613F99",
    "RubineRed" => "#ED017D",
    "Salmon" => "#F69289",
    "SeaGreen" => "#3FBC9D",
    "Sepia" => "#671800",
    "SkyBlue" => "#46C5DD",
    "SpringGreen" => "#C6DC67",
    "Tan" => "#DA9D76",
    "TealBlue" => "#00AEB3",
    "Thistle" => "#D883B7",
    "Turquoise" => "#00B4CE",
    "Violet" => "#58429B",
    "VioletRed" => "#EF58A0",
    "White" => "#FFFFFF",
    "WildStrawberry" => "#EE2967",
    "Yellow" => "#FFF200",
    "YellowGreen" => "#98CC70",
    "YellowOrange" => "#FAA21A",
};

/// Builds the color package.
#[must_use]
pub fn package() -> Package {
    Package {
        macros: vec![HandlerMap::from_table("color", &COMMANDS, |spec| spec)],
        requires: vec![base::NAME.to_owned()],
        ..Package::new(NAME, EXTENSION_PRIORITY)
    }
}

/// Converts `value`, given in `model`, to a `mathcolor` value. Named colors
/// are looked up in `defined` first, then in the dvips table, and are
/// passed through unchanged when neither knows them.
pub fn resolve(
    defined: &KeyMap<String, String>,
    model: Option<&str>,
    value: &str,
) -> Result<String, ParseError> {
    let value = value.trim();
    match model.map(str::trim) {
        None | Some("" | "named") => Ok(defined
            .get(value)
            .cloned()
            .or_else(|| NAMED.get(value).map(|hex| (*hex).to_owned()))
            .unwrap_or_else(|| value.to_owned())),
        Some("rgb") => {
            let parts = components(value, "rgb", 3)?;
            let [r, g, b] = parts[..] else {
                return Err(invalid("rgb", value));
            };
            Ok(hex([unit(r, "rgb", value)?, unit(g, "rgb", value)?, unit(b, "rgb", value)?]))
        }
        Some("RGB") => {
            let parts: Vec<&str> = value.split(',').map(str::trim).collect();
            let [r, g, b] = parts[..] else {
                return Err(invalid("RGB", value));
            };
            let byte = |part: &str| part.parse::<u8>().map_err(|_| invalid("RGB", value));
            Ok(hex([byte(r)?, byte(g)?, byte(b)?]))
        }
        Some("gray") => {
            let parts = components(value, "gray", 1)?;
            let [level] = parts[..] else {
                return Err(invalid("gray", value));
            };
            let level = unit(level, "gray", value)?;
            Ok(hex([level; 3]))
        }
        Some(other) => Err(ParseError::new(ParseErrorKind::UndefinedColorModel {
            model: other.to_owned(),
        })),
    }
}

fn invalid(model: &str, value: &str) -> ParseError {
    ParseError::new(ParseErrorKind::InvalidColorValue {
        model: model.to_owned(),
        value: value.to_owned(),
    })
}

/// Exactly `count` comma separated decimal components.
fn components(value: &str, model: &str, count: usize) -> Result<Vec<f64>, ParseError> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid(model, value)))
        .collect::<Result<Vec<_>, _>>()?;
    if parts.len() == count {
        Ok(parts)
    } else {
        Err(invalid(model, value))
    }
}

/// A component in `[0, 1]` scaled to a byte.
fn unit(x: f64, model: &str, value: &str) -> Result<u8, ParseError> {
    if (0.0..=1.0).contains(&x) {
        Ok((x * 255.0).round() as u8)
    } else {
        Err(invalid(model, value))
    }
}

fn hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Reads `[model]{value}` and resolves it.
fn get_color(parser: &mut TexParser<'_>, name: &str) -> ParseResult<String> {
    let model = parser.get_brackets(name)?;
    let value = parser.get_argument(name, false)?;
    Ok(resolve(&parser.state.colors, model.as_deref(), &value)?)
}

/// `\color[model]{value}`: colors the rest of the enclosing group.
fn color(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let color = get_color(parser, name)?;
    parser.push(StackItem::new(ItemKind::Style {
        attrs: vec![("mathcolor".to_owned(), color)],
    }))
}

/// `\textcolor[model]{value}{math}`.
fn text_color(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let color = get_color(parser, name)?;
    let arg = parser.parse_arg(name)?;
    let node = MmlNode::with_children(NodeKind::Mstyle, base::contents(arg)).attr("mathcolor", color);
    parser.push_node(node)
}

/// `\colorbox[model]{value}{text}`.
fn color_box(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let color = get_color(parser, name)?;
    let text = parser.get_argument(name, false)?;
    let inner = parser.token(NodeKind::Mtext, &text);
    let node = MmlNode::with_children(NodeKind::Mpadded, vec![inner])
        .attr("mathbackground", color)
        .attr("width", "+10px")
        .attr("height", "+5px")
        .attr("depth", "+5px")
        .attr("lspace", "5px");
    parser.push_node(node)
}

/// `\definecolor{name}{model}{value}`.
fn define_color(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let color_name = parser.get_argument(name, false)?.trim().to_owned();
    let model = parser.get_argument(name, false)?;
    let value = parser.get_argument(name, false)?;
    let color = resolve(&parser.state.colors, Some(&model), &value)?;
    debug!("defined color '{color_name}' as {color}");
    parser.state.colors.insert(color_name, color);
    Ok(())
}
