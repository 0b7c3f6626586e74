//! Class file header reading and writing
//!
//! Only the part of a class file needed for type resolution is read: magic,
//! version, the constant pool, access flags, this class, super class and
//! interfaces. Fields, methods and attributes are ignored.

use crate::error::ClassFormatError;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use contracts_core::{ClassName, IllegalClassNameError};
use std::io::{self, Cursor, Read, Write};

pub const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

const TAG_UTF8: u8 = 1;
const TAG_CLASS: u8 = 7;

/// Java 8
const DEFAULT_MAJOR_VERSION: u16 = 52;

/// Decoded constant pool entry; only the kinds headers refer to are kept
#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class(u16),
    Other,
    /// Index 0 and the slot after a long or double
    Unusable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFileHeader {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name of the class
    pub this_class: String,
    /// Internal name of the super class; `None` only for `java/lang/Object`
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
}

impl ClassFileHeader {
    /// Header of a public class with the given internal names
    pub fn new(this_class: &str, super_class: Option<&str>, interfaces: &[&str]) -> Self {
        Self {
            minor_version: 0,
            major_version: DEFAULT_MAJOR_VERSION,
            access_flags: ACC_PUBLIC | ACC_SUPER,
            this_class: this_class.to_string(),
            super_class: super_class.map(str::to_string),
            interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
        }
    }

    pub fn with_access_flags(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn name(&self) -> Result<ClassName, IllegalClassNameError> {
        ClassName::for_internal(&self.this_class)
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFormatError> {
        let mut input = Cursor::new(bytes);

        let magic = input
            .read_u32::<BigEndian>()
            .map_err(|_| ClassFormatError::Truncated("magic"))?;
        if magic != MAGIC {
            return Err(ClassFormatError::BadMagic(magic));
        }
        let minor_version = read_u16(&mut input, "minor version")?;
        let major_version = read_u16(&mut input, "major version")?;
        let pool = read_constant_pool(&mut input)?;

        let access_flags = read_u16(&mut input, "access flags")?;
        let this_index = read_u16(&mut input, "this class")?;
        let this_class = class_name(&pool, this_index)?.to_string();
        let super_index = read_u16(&mut input, "super class")?;
        let super_class = match super_index {
            0 => None,
            index => Some(class_name(&pool, index)?.to_string()),
        };
        let count = read_u16(&mut input, "interfaces count")?;
        let mut interfaces = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let index = read_u16(&mut input, "interfaces")?;
            interfaces.push(class_name(&pool, index)?.to_string());
        }

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
        })
    }

    /// Writes a complete class file with this header and no members
    pub fn write<W: Write>(&self, mut out: W) -> io::Result<()> {
        let names: Vec<&str> = std::iter::once(self.this_class.as_str())
            .chain(self.super_class.as_deref())
            .chain(self.interfaces.iter().map(String::as_str))
            .collect();
        // Each name takes a Utf8 entry at 2k+1 and a Class entry at 2k+2
        let class_index = |k: usize| (2 * k + 2) as u16;

        out.write_u32::<BigEndian>(MAGIC)?;
        out.write_u16::<BigEndian>(self.minor_version)?;
        out.write_u16::<BigEndian>(self.major_version)?;
        out.write_u16::<BigEndian>((2 * names.len() + 1) as u16)?;
        for (k, name) in names.iter().enumerate() {
            let encoded = encode_modified_utf8(name);
            out.write_u8(TAG_UTF8)?;
            out.write_u16::<BigEndian>(encoded.len() as u16)?;
            out.write_all(&encoded)?;
            out.write_u8(TAG_CLASS)?;
            out.write_u16::<BigEndian>(class_index(k) - 1)?;
        }

        out.write_u16::<BigEndian>(self.access_flags)?;
        out.write_u16::<BigEndian>(class_index(0))?;
        let first_interface = if self.super_class.is_some() {
            out.write_u16::<BigEndian>(class_index(1))?;
            2
        } else {
            out.write_u16::<BigEndian>(0)?;
            1
        };
        out.write_u16::<BigEndian>(self.interfaces.len() as u16)?;
        for k in 0..self.interfaces.len() {
            out.write_u16::<BigEndian>(class_index(first_interface + k))?;
        }
        // fields, methods, attributes
        for _ in 0..3 {
            out.write_u16::<BigEndian>(0)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write(&mut bytes);
        bytes
    }
}

fn read_u16(input: &mut Cursor<&[u8]>, what: &'static str) -> Result<u16, ClassFormatError> {
    input
        .read_u16::<BigEndian>()
        .map_err(|_| ClassFormatError::Truncated(what))
}

fn read_constant_pool(input: &mut Cursor<&[u8]>) -> Result<Vec<Constant>, ClassFormatError> {
    const WHAT: &str = "constant pool";
    let count = read_u16(input, "constant pool count")?;
    let mut pool = vec![Constant::Unusable; usize::from(count)];
    let mut index: u16 = 1;

    while index < count {
        let tag = input
            .read_u8()
            .map_err(|_| ClassFormatError::Truncated(WHAT))?;
        let mut width = 1;
        let constant = match tag {
            TAG_UTF8 => {
                let len = read_u16(input, WHAT)?;
                let mut bytes = vec![0; usize::from(len)];
                input
                    .read_exact(&mut bytes)
                    .map_err(|_| ClassFormatError::Truncated(WHAT))?;
                Constant::Utf8(decode_modified_utf8(&bytes, index)?)
            }
            TAG_CLASS => Constant::Class(read_u16(input, WHAT)?),
            // Integer, Float
            3 | 4 => skip(input, 4)?,
            // Long, Double occupy two slots
            5 | 6 => {
                width = 2;
                skip(input, 8)?
            }
            // String, MethodType, Module, Package
            8 | 16 | 19 | 20 => skip(input, 2)?,
            // Field/Method/InterfaceMethod refs, NameAndType, Dynamic, InvokeDynamic
            9..=12 | 17 | 18 => skip(input, 4)?,
            // MethodHandle
            15 => skip(input, 3)?,
            tag => return Err(ClassFormatError::UnknownTag { tag, index }),
        };
        pool[usize::from(index)] = constant;
        index = index.saturating_add(width);
    }
    Ok(pool)
}

fn skip(input: &mut Cursor<&[u8]>, len: u64) -> Result<Constant, ClassFormatError> {
    let end = input.position() + len;
    if end > input.get_ref().len() as u64 {
        return Err(ClassFormatError::Truncated("constant pool"));
    }
    input.set_position(end);
    Ok(Constant::Other)
}

/// Internal name referenced by the Class constant at `index`
fn class_name(pool: &[Constant], index: u16) -> Result<&str, ClassFormatError> {
    let bad = |index| ClassFormatError::BadConstant {
        index,
        expected: "class",
    };
    match pool.get(usize::from(index)) {
        Some(Constant::Class(name_index)) => match pool.get(usize::from(*name_index)) {
            Some(Constant::Utf8(name)) => Ok(name),
            _ => Err(bad(*name_index)),
        },
        _ => Err(bad(index)),
    }
}

/// Decodes the JVM's modified UTF-8 (surrogates encoded separately, NUL as
/// two bytes)
fn decode_modified_utf8(bytes: &[u8], index: u16) -> Result<String, ClassFormatError> {
    let bad = || ClassFormatError::BadUtf8(index);
    let continuation = |i: usize| -> Result<u16, ClassFormatError> {
        match bytes.get(i) {
            Some(b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
            _ => Err(bad()),
        }
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            units.push((u16::from(b & 0x1F) << 6) | continuation(i + 1)?);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            units.push((u16::from(b & 0x0F) << 12) | (continuation(i + 1)? << 6) | continuation(i + 2)?);
            i += 3;
        } else {
            return Err(bad());
        }
    }
    String::from_utf16(&units).map_err(|_| bad())
}

fn encode_modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "class_file_tests.rs"]
mod tests;
