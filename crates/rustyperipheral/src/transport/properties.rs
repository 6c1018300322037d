//! Typed property values exported over the transport
//!
//! Values mirror the variant types the platform daemon expects, so an
//! adapter for a concrete bus only has to map each variant onto its own
//! wire signature.

use std::collections::BTreeMap;
use std::fmt;

/// A property map keyed by property name
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Properties of one object keyed by interface name
pub type InterfaceMap = BTreeMap<String, PropertyMap>;

/// A single exported property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// UTF-8 string
    Str(String),
    /// Boolean flag
    Bool(bool),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Object path
    Path(String),
    /// Array of strings
    StrArray(Vec<String>),
    /// Array of object paths
    PathArray(Vec<String>),
    /// Byte array
    Bytes(Vec<u8>),
    /// Dictionary of 16-bit keys to byte arrays
    U16ByteMap(BTreeMap<u16, Vec<u8>>),
    /// Dictionary of string keys to byte arrays
    StrByteMap(BTreeMap<String, Vec<u8>>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) | PropertyValue::Path(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            PropertyValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            PropertyValue::StrArray(v) | PropertyValue::PathArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PropertyValue::Bytes(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => write!(f, "{:?}", s),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::U16(v) => write!(f, "{}", v),
            PropertyValue::Path(p) => write!(f, "{}", p),
            PropertyValue::StrArray(v) | PropertyValue::PathArray(v) => {
                write!(f, "[{}]", v.join(", "))
            }
            PropertyValue::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            PropertyValue::U16ByteMap(m) => {
                let entries: Vec<String> = m
                    .iter()
                    .map(|(k, v)| format!("{:#06x}: 0x{}", k, hex::encode(v)))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            PropertyValue::StrByteMap(m) => {
                let entries: Vec<String> = m
                    .iter()
                    .map(|(k, v)| format!("{}: 0x{}", k, hex::encode(v)))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}
