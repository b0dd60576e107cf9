//! ESRI WKT (well-known text) CRS parsing.
//!
//! Shapefile `.prj` companions carry a single-line WKT1 definition. This
//! module parses the bracketed structure and resolves it to one of the
//! supported [`SourceProjection`] variants. Anything outside that set is an
//! unsupported-projection error, which the pipeline surfaces as a
//! reprojection failure for the layer.

use std::collections::HashMap;

use crate::ellipsoid::Ellipsoid;
use crate::lambert::LambertConformal;
use crate::mercator::WebMercator;
use crate::transverse::TransverseMercator;
use crate::{ProjectionError, ProjectionResult, SourceProjection};

/// Parse the contents of a `.prj` file into a source projection.
///
/// Geographic definitions (`GEOGCS` root) resolve to the identity transform.
/// NAD83 and WGS84 are treated as coincident, the usual convention for web
/// mapping at sub-meter datum offsets.
pub fn parse_wkt(text: &str) -> ProjectionResult<SourceProjection> {
    let root = Parser::new(text).parse_root()?;

    match root.keyword.to_ascii_uppercase().as_str() {
        "GEOGCS" => Ok(SourceProjection::Geographic),
        "PROJCS" => interpret_projcs(&root),
        other => Err(ProjectionError::UnsupportedProjection(other.to_string())),
    }
}

// ============================================================================
// Syntax Tree
// ============================================================================

#[derive(Debug, Clone)]
enum WktValue {
    Text(String),
    Number(f64),
    Node(WktNode),
}

#[derive(Debug, Clone)]
struct WktNode {
    keyword: String,
    values: Vec<WktValue>,
}

impl WktNode {
    /// First direct child node with the given keyword (case-insensitive).
    /// Direct children only, so a PROJCS linear UNIT is never confused with
    /// the angular UNIT nested inside its GEOGCS.
    fn child(&self, keyword: &str) -> Option<&WktNode> {
        self.values.iter().find_map(|v| match v {
            WktValue::Node(n) if n.keyword.eq_ignore_ascii_case(keyword) => Some(n),
            _ => None,
        })
    }

    /// All direct child nodes with the given keyword.
    fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a WktNode> {
        self.values.iter().filter_map(move |v| match v {
            WktValue::Node(n) if n.keyword.eq_ignore_ascii_case(keyword) => Some(n),
            _ => None,
        })
    }

    fn text_at(&self, index: usize) -> Option<&str> {
        match self.values.get(index) {
            Some(WktValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    fn number_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(WktValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

// ============================================================================
// Lexer / Parser
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Comma,
    Str(String),
    Word(String),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        let mut tokens = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match c {
                '[' | '(' => {
                    tokens.push(Token::Open);
                    i += 1;
                }
                ']' | ')' => {
                    tokens.push(Token::Close);
                    i += 1;
                }
                ',' => {
                    tokens.push(Token::Comma);
                    i += 1;
                }
                '"' => {
                    i += 1;
                    let start = i;
                    while i < chars.len() && chars[i] != '"' {
                        i += 1;
                    }
                    tokens.push(Token::Str(chars[start..i].iter().collect()));
                    i += 1; // closing quote (or end of input)
                }
                c if c.is_whitespace() => i += 1,
                _ => {
                    let start = i;
                    while i < chars.len()
                        && !matches!(chars[i], '[' | '(' | ']' | ')' | ',' | '"')
                        && !chars[i].is_whitespace()
                    {
                        i += 1;
                    }
                    tokens.push(Token::Word(chars[start..i].iter().collect()));
                }
            }
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_root(&mut self) -> ProjectionResult<WktNode> {
        self.parse_node()
    }

    fn parse_node(&mut self) -> ProjectionResult<WktNode> {
        let keyword = match self.next() {
            Some(Token::Word(w)) => w,
            other => {
                return Err(ProjectionError::InvalidWkt(format!(
                    "expected keyword, found {:?}",
                    other
                )))
            }
        };
        match self.next() {
            Some(Token::Open) => {}
            other => {
                return Err(ProjectionError::InvalidWkt(format!(
                    "expected '[' after {}, found {:?}",
                    keyword, other
                )))
            }
        }

        let mut values = vec![self.parse_value()?];
        loop {
            match self.next() {
                Some(Token::Comma) => values.push(self.parse_value()?),
                Some(Token::Close) => break,
                other => {
                    return Err(ProjectionError::InvalidWkt(format!(
                        "expected ',' or ']' inside {}, found {:?}",
                        keyword, other
                    )))
                }
            }
        }

        Ok(WktNode { keyword, values })
    }

    fn parse_value(&mut self) -> ProjectionResult<WktValue> {
        match self.peek().cloned() {
            Some(Token::Str(text)) => {
                self.next();
                Ok(WktValue::Text(text))
            }
            Some(Token::Word(word)) => {
                if let Ok(n) = word.parse::<f64>() {
                    self.next();
                    return Ok(WktValue::Number(n));
                }
                // A bare word is either a nested node (keyword followed by
                // brackets) or an enumeration literal such as AXIS "NORTH".
                if self.tokens.get(self.pos + 1) == Some(&Token::Open) {
                    Ok(WktValue::Node(self.parse_node()?))
                } else {
                    self.next();
                    Ok(WktValue::Text(word))
                }
            }
            other => Err(ProjectionError::InvalidWkt(format!(
                "expected value, found {:?}",
                other
            ))),
        }
    }
}

// ============================================================================
// PROJCS Interpretation
// ============================================================================

fn interpret_projcs(root: &WktNode) -> ProjectionResult<SourceProjection> {
    let crs_name = root.text_at(0).unwrap_or("<unnamed>").to_string();

    let projection_name = root
        .child("PROJECTION")
        .and_then(|n| n.text_at(0))
        .ok_or_else(|| {
            ProjectionError::InvalidWkt(format!("PROJCS '{}' has no PROJECTION", crs_name))
        })?
        .to_ascii_lowercase()
        .replace(' ', "_");

    let params = collect_parameters(root);
    let unit_to_meter = root.child("UNIT").and_then(|n| n.number_at(1)).unwrap_or(1.0);
    let ellipsoid = resolve_ellipsoid(root)?;

    let param = |name: &str| params.get(name).copied();
    let require = |name: &str| {
        param(name).ok_or_else(|| ProjectionError::MissingParameter(name.to_string()))
    };

    match projection_name.as_str() {
        "lambert_conformal_conic" | "lambert_conformal_conic_2sp" => {
            let lon0 = require("central_meridian")?;
            let lat0 = param("latitude_of_origin")
                .or_else(|| param("standard_parallel_1"))
                .ok_or_else(|| {
                    ProjectionError::MissingParameter("latitude_of_origin".to_string())
                })?;
            let sp1 = param("standard_parallel_1").unwrap_or(lat0);
            let sp2 = param("standard_parallel_2").unwrap_or(sp1);
            Ok(SourceProjection::LambertConformal(LambertConformal::new(
                ellipsoid,
                sp1,
                sp2,
                lat0,
                lon0,
                param("false_easting").unwrap_or(0.0),
                param("false_northing").unwrap_or(0.0),
                unit_to_meter,
            )))
        }
        "transverse_mercator" => {
            let lon0 = require("central_meridian")?;
            Ok(SourceProjection::TransverseMercator(
                TransverseMercator::new(
                    ellipsoid,
                    param("latitude_of_origin").unwrap_or(0.0),
                    lon0,
                    param("scale_factor").unwrap_or(1.0),
                    param("false_easting").unwrap_or(0.0),
                    param("false_northing").unwrap_or(0.0),
                    unit_to_meter,
                ),
            ))
        }
        "mercator_auxiliary_sphere" | "popular_visualisation_pseudo_mercator" | "pseudo_mercator" => {
            Ok(SourceProjection::WebMercator(WebMercator::new(
                unit_to_meter,
            )))
        }
        other => Err(ProjectionError::UnsupportedProjection(format!(
            "{} (CRS '{}')",
            other, crs_name
        ))),
    }
}

/// Collect PARAMETER name/value pairs, names normalized to lowercase.
fn collect_parameters(root: &WktNode) -> HashMap<String, f64> {
    let mut params = HashMap::new();
    for node in root.children("PARAMETER") {
        if let (Some(name), Some(value)) = (node.text_at(0), node.number_at(1)) {
            params.insert(name.to_ascii_lowercase(), value);
        }
    }
    params
}

/// Resolve the ellipsoid from PROJCS > GEOGCS > DATUM > SPHEROID.
fn resolve_ellipsoid(root: &WktNode) -> ProjectionResult<Ellipsoid> {
    let spheroid = root
        .child("GEOGCS")
        .and_then(|g| g.child("DATUM"))
        .and_then(|d| d.child("SPHEROID"))
        .ok_or_else(|| ProjectionError::MissingParameter("SPHEROID".to_string()))?;

    match (spheroid.number_at(1), spheroid.number_at(2)) {
        (Some(semi_major), Some(inv_flattening)) => {
            Ok(Ellipsoid::new(semi_major, inv_flattening))
        }
        _ => Err(ProjectionError::InvalidWkt(
            "SPHEROID is missing its axis parameters".to_string(),
        )),
    }
}
