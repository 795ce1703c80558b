//! Core data model for site designs.
//!
//! A design is a tree of `Element`s rooted at the Ground. Foundations (and
//! cuboids) are box containers; most of their direct children store their
//! horizontal position *normalized* to the container's extent, so a child
//! at `cx = 0.25` sits a quarter of the container's length east of its
//! center. Ground-parented elements use absolute world units.
//!
//! Type-specific data lives in `ElementKind`, a tagged sum type. Code
//! that needs a payload field matches on the variant; there are no
//! unchecked casts.

use crate::error::{Result, SceneError};
use crate::id::ElementId;
use crate::math::{Point2, Vec3};
use serde::{Deserialize, Serialize};

// ─── Element types ───────────────────────────────────────────────────────

/// The closed set of element tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Ground,
    Foundation,
    Cuboid,
    Wall,
    Door,
    Window,
    Roof,
    SolarPanel,
    ParabolicTrough,
    ParabolicDish,
    FresnelReflector,
    Heliostat,
    Sensor,
    BatteryStorage,
    Tree,
    Human,
    Polygon,
}

/// How a child of a box container reacts to the container being reshaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildClass {
    /// Rectangular footprint on the top face; must stay inside the parent.
    Footprint,
    /// Point footprint on the top face (sensors); must stay inside the parent.
    Point,
    /// Vertex-list footprint; every vertex must stay inside the parent.
    Polygon,
    /// Trees and people that can sit on any face of a box.
    Decor,
    /// Walls are not moved by container resizes.
    Wall,
    /// Not affected by container geometry.
    Passive,
}

impl ElementType {
    /// Box-shaped parents whose resize cascades into children.
    pub fn is_container(self) -> bool {
        matches!(self, ElementType::Foundation | ElementType::Cuboid)
    }

    pub fn child_class(self) -> ChildClass {
        match self {
            ElementType::SolarPanel
            | ElementType::ParabolicTrough
            | ElementType::ParabolicDish
            | ElementType::FresnelReflector
            | ElementType::Heliostat
            | ElementType::BatteryStorage => ChildClass::Footprint,
            ElementType::Sensor => ChildClass::Point,
            ElementType::Polygon => ChildClass::Polygon,
            ElementType::Tree | ElementType::Human => ChildClass::Decor,
            ElementType::Wall => ChildClass::Wall,
            _ => ChildClass::Passive,
        }
    }

    /// Whether `cx`/`cy` are stored as fractions of the parent's extent
    /// when the parent is a container.
    pub fn is_normalized_in_container(self) -> bool {
        !matches!(self, ElementType::Tree | ElementType::Human)
    }

    /// Types whose elevation follows a sloped foundation surface.
    pub fn follows_slope(self) -> bool {
        matches!(self, ElementType::SolarPanel | ElementType::BatteryStorage)
    }
}

// ─── Payloads ────────────────────────────────────────────────────────────

/// Type-specific payload. The variant is the element's discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// World root. Exactly one per scene.
    Ground,
    Foundation {
        enable_slope: bool,
        /// Slope angle in radians, rising along the local +x axis.
        slope: f64,
    },
    Cuboid,
    Wall {
        left_join: Option<ElementId>,
        right_join: Option<ElementId>,
    },
    Door {
        u_value: f64,
    },
    Window {
        u_value: f64,
    },
    Roof,
    SolarPanel {
        /// Tilt in radians.
        tilt_angle: f64,
    },
    ParabolicTrough,
    ParabolicDish,
    FresnelReflector,
    Heliostat,
    Sensor,
    BatteryStorage {
        charging_efficiency: f64,
        discharging_efficiency: f64,
    },
    Tree,
    Human,
    /// Vertices are normalized to the parent footprint like `cx`/`cy`.
    Polygon { vertices: Vec<Point2> },
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Ground => ElementType::Ground,
            ElementKind::Foundation { .. } => ElementType::Foundation,
            ElementKind::Cuboid => ElementType::Cuboid,
            ElementKind::Wall { .. } => ElementType::Wall,
            ElementKind::Door { .. } => ElementType::Door,
            ElementKind::Window { .. } => ElementType::Window,
            ElementKind::Roof => ElementType::Roof,
            ElementKind::SolarPanel { .. } => ElementType::SolarPanel,
            ElementKind::ParabolicTrough => ElementType::ParabolicTrough,
            ElementKind::ParabolicDish => ElementType::ParabolicDish,
            ElementKind::FresnelReflector => ElementType::FresnelReflector,
            ElementKind::Heliostat => ElementType::Heliostat,
            ElementKind::Sensor => ElementType::Sensor,
            ElementKind::BatteryStorage { .. } => ElementType::BatteryStorage,
            ElementKind::Tree => ElementType::Tree,
            ElementKind::Human => ElementType::Human,
            ElementKind::Polygon { .. } => ElementType::Polygon,
        }
    }

    pub fn foundation() -> Self {
        ElementKind::Foundation {
            enable_slope: false,
            slope: 0.0,
        }
    }

    pub fn battery() -> Self {
        ElementKind::BatteryStorage {
            charging_efficiency: 0.95,
            discharging_efficiency: 0.95,
        }
    }

    pub fn solar_panel() -> Self {
        ElementKind::SolarPanel { tilt_angle: 0.0 }
    }

    pub fn wall() -> Self {
        ElementKind::Wall {
            left_join: None,
            right_join: None,
        }
    }
}

// ─── Properties ──────────────────────────────────────────────────────────

/// Local box axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Properties the mutation engine can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Lx,
    Ly,
    Lz,
    /// `rotation[2]`.
    Azimuth,
    Slope,
    EnableSlope,
    UValue,
    ChargingEfficiency,
    DischargingEfficiency,
    TiltAngle,
    Color,
    Label,
}

impl Property {
    /// The extent axis this property sizes, if any.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Property::Lx => Some(Axis::X),
            Property::Ly => Some(Axis::Y),
            Property::Lz => Some(Axis::Z),
            _ => None,
        }
    }

    /// Edits of these properties on a container cascade into its children.
    pub fn cascades(self) -> bool {
        matches!(
            self,
            Property::Lx | Property::Ly | Property::Lz | Property::Slope | Property::EnableSlope
        )
    }
}

/// A property value. Numbers compare with a tolerance, everything else
/// exactly (see `scope::need_change`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Equality with `tol` applied to numbers.
    pub fn approx_eq(&self, other: &PropertyValue, tol: f64) -> bool {
        match (self, other) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => (a - b).abs() < tol,
            _ => self == other,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Flag(b)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

// ─── Attachment ──────────────────────────────────────────────────────────

/// Where an element hangs in the tree: its parent plus the denormalized
/// nearest Foundation ancestor. Ground-parented elements have no foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub parent: ElementId,
    pub foundation: Option<ElementId>,
}

impl Attachment {
    pub fn ground() -> Self {
        Self {
            parent: ElementId::ground(),
            foundation: None,
        }
    }
}

// ─── Element ─────────────────────────────────────────────────────────────

/// A single element of the scene graph. The parent link is owned by the
/// graph (`SceneStore::parent_of`); `foundation_id` is cached here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub foundation_id: Option<ElementId>,

    pub cx: f64,
    pub cy: f64,
    pub cz: f64,

    pub lx: f64,
    pub ly: f64,
    pub lz: f64,

    /// Euler-like angles; index 2 is the azimuth.
    pub rotation: [f64; 3],

    /// Normal of the surface the element is mounted on.
    pub normal: Vec3,

    pub locked: bool,
    pub color: String,
    pub label: String,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            foundation_id: None,
            cx: 0.0,
            cy: 0.0,
            cz: 0.0,
            lx: 1.0,
            ly: 1.0,
            lz: 1.0,
            rotation: [0.0; 3],
            normal: Vec3::z(),
            locked: false,
            color: "#808080".into(),
            label: String::new(),
        }
    }

    pub fn at(mut self, cx: f64, cy: f64, cz: f64) -> Self {
        self.cx = cx;
        self.cy = cy;
        self.cz = cz;
        self
    }

    pub fn sized(mut self, lx: f64, ly: f64, lz: f64) -> Self {
        self.lx = lx;
        self.ly = ly;
        self.lz = lz;
        self
    }

    pub fn rotated(mut self, azimuth: f64) -> Self {
        self.rotation[2] = azimuth;
        self
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn azimuth(&self) -> f64 {
        self.rotation[2]
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.cx, self.cy, self.cz)
    }

    pub fn set_position(&mut self, p: Vec3) {
        self.cx = p.x;
        self.cy = p.y;
        self.cz = p.z;
    }

    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.lx, self.ly, self.lz)
    }

    pub fn extent_along(&self, axis: Axis) -> f64 {
        self.extent()[axis.index()]
    }

    /// `(enable_slope, slope)` for foundations, `None` otherwise.
    pub fn slope(&self) -> Option<(bool, f64)> {
        match self.kind {
            ElementKind::Foundation {
                enable_slope,
                slope,
            } => Some((enable_slope, slope)),
            _ => None,
        }
    }

    /// The slope angle currently in effect (zero when disabled).
    pub fn effective_slope(&self) -> f64 {
        match self.slope() {
            Some((true, slope)) => slope,
            _ => 0.0,
        }
    }

    pub fn vertices(&self) -> Option<&[Point2]> {
        match &self.kind {
            ElementKind::Polygon { vertices } => Some(vertices),
            _ => None,
        }
    }

    /// Read a property, or `None` if this kind doesn't carry it.
    pub fn property(&self, property: Property) -> Option<PropertyValue> {
        let value: PropertyValue = match (property, &self.kind) {
            (Property::Lx, _) => self.lx.into(),
            (Property::Ly, _) => self.ly.into(),
            (Property::Lz, _) => self.lz.into(),
            (Property::Azimuth, _) => self.azimuth().into(),
            (Property::Color, _) => PropertyValue::Text(self.color.clone()),
            (Property::Label, _) => PropertyValue::Text(self.label.clone()),
            (Property::Slope, ElementKind::Foundation { slope, .. }) => (*slope).into(),
            (Property::EnableSlope, ElementKind::Foundation { enable_slope, .. }) => {
                (*enable_slope).into()
            }
            (Property::UValue, ElementKind::Door { u_value })
            | (Property::UValue, ElementKind::Window { u_value }) => (*u_value).into(),
            (
                Property::ChargingEfficiency,
                ElementKind::BatteryStorage {
                    charging_efficiency,
                    ..
                },
            ) => (*charging_efficiency).into(),
            (
                Property::DischargingEfficiency,
                ElementKind::BatteryStorage {
                    discharging_efficiency,
                    ..
                },
            ) => (*discharging_efficiency).into(),
            (Property::TiltAngle, ElementKind::SolarPanel { tilt_angle }) => (*tilt_angle).into(),
            _ => return None,
        };
        Some(value)
    }

    /// Write a property. Fails if the kind lacks it or the value has the
    /// wrong shape; the element is untouched on failure.
    pub fn set_property(&mut self, property: Property, value: &PropertyValue) -> Result<()> {
        let missing = SceneError::MissingProperty {
            id: self.id,
            element_type: self.element_type(),
            property,
        };
        match property {
            Property::Lx | Property::Ly | Property::Lz | Property::Azimuth => {
                let n = number(property, value)?;
                match property {
                    Property::Lx => self.lx = n,
                    Property::Ly => self.ly = n,
                    Property::Lz => self.lz = n,
                    _ => self.rotation[2] = n,
                }
            }
            Property::Color => self.color = text(property, value)?,
            Property::Label => self.label = text(property, value)?,
            Property::Slope => match &mut self.kind {
                ElementKind::Foundation { slope, .. } => *slope = number(property, value)?,
                _ => return Err(missing),
            },
            Property::EnableSlope => match &mut self.kind {
                ElementKind::Foundation { enable_slope, .. } => {
                    *enable_slope = flag(property, value)?
                }
                _ => return Err(missing),
            },
            Property::UValue => match &mut self.kind {
                ElementKind::Door { u_value } | ElementKind::Window { u_value } => {
                    *u_value = number(property, value)?
                }
                _ => return Err(missing),
            },
            Property::ChargingEfficiency => match &mut self.kind {
                ElementKind::BatteryStorage {
                    charging_efficiency,
                    ..
                } => *charging_efficiency = number(property, value)?,
                _ => return Err(missing),
            },
            Property::DischargingEfficiency => match &mut self.kind {
                ElementKind::BatteryStorage {
                    discharging_efficiency,
                    ..
                } => *discharging_efficiency = number(property, value)?,
                _ => return Err(missing),
            },
            Property::TiltAngle => match &mut self.kind {
                ElementKind::SolarPanel { tilt_angle } => *tilt_angle = number(property, value)?,
                _ => return Err(missing),
            },
        }
        Ok(())
    }
}

fn number(property: Property, value: &PropertyValue) -> Result<f64> {
    value.as_number().ok_or(SceneError::WrongValue {
        property,
        expected: "number",
    })
}

fn flag(property: Property, value: &PropertyValue) -> Result<bool> {
    value.as_flag().ok_or(SceneError::WrongValue {
        property,
        expected: "boolean",
    })
}

fn text(property: Property, value: &PropertyValue) -> Result<String> {
    match value {
        PropertyValue::Text(s) => Ok(s.clone()),
        _ => Err(SceneError::WrongValue {
            property,
            expected: "text",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_properties_roundtrip() {
        let mut b = Element::new(ElementId::intern("b1"), ElementKind::battery());
        assert_eq!(
            b.property(Property::ChargingEfficiency),
            Some(PropertyValue::Number(0.95))
        );
        b.set_property(Property::ChargingEfficiency, &0.8.into())
            .unwrap();
        assert_eq!(
            b.property(Property::ChargingEfficiency),
            Some(PropertyValue::Number(0.8))
        );
    }

    #[test]
    fn missing_property_is_rejected() {
        let mut tree = Element::new(ElementId::intern("t1"), ElementKind::Tree);
        assert_eq!(tree.property(Property::UValue), None);
        let err = tree.set_property(Property::UValue, &1.2.into()).unwrap_err();
        assert!(matches!(err, SceneError::MissingProperty { .. }));
    }

    #[test]
    fn wrong_value_shape_is_rejected() {
        let mut f = Element::new(ElementId::intern("f1"), ElementKind::foundation());
        let err = f
            .set_property(Property::EnableSlope, &PropertyValue::Number(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::WrongValue {
                property: Property::EnableSlope,
                expected: "boolean"
            }
        );
        assert_eq!(f.slope(), Some((false, 0.0)));
    }

    #[test]
    fn effective_slope_is_zero_when_disabled() {
        let mut f = Element::new(ElementId::intern("f2"), ElementKind::foundation());
        f.set_property(Property::Slope, &0.2.into()).unwrap();
        assert_eq!(f.effective_slope(), 0.0);
        f.set_property(Property::EnableSlope, &true.into()).unwrap();
        assert_eq!(f.effective_slope(), 0.2);
    }

    #[test]
    fn child_classes() {
        assert_eq!(ElementType::SolarPanel.child_class(), ChildClass::Footprint);
        assert_eq!(ElementType::Sensor.child_class(), ChildClass::Point);
        assert_eq!(ElementType::Human.child_class(), ChildClass::Decor);
        assert_eq!(ElementType::Door.child_class(), ChildClass::Passive);
        assert!(!ElementType::Tree.is_normalized_in_container());
    }
}
