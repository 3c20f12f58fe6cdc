//! Move type system representations.
//!
//! Identifiers, module ids, struct tags and type tags, with their canonical
//! encoding and the textual form the REST API uses in paths and type names.
//!
//! # Security
//!
//! All parsing functions enforce length and nesting limits.

use crate::error::{TransferError, TransferResult};
use crate::types::AccountAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for type tag strings.
const MAX_TYPE_TAG_LENGTH: usize = 1024;

/// Maximum length for identifier strings.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Maximum depth for nested type arguments (e.g., vector<vector<vector<...>>>).
const MAX_TYPE_NESTING_DEPTH: usize = 8;

/// An identifier in Move (module name, function name, struct name).
///
/// Identifiers must start with a letter or underscore and contain
/// only ASCII alphanumerics and underscores. Decoded identifiers are
/// validated the same way.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new identifier, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidTypeTag`] if the identifier is empty,
    /// exceeds 128 characters, does not start with a letter or underscore, or
    /// contains characters that are not alphanumeric or underscore.
    pub fn new(s: impl Into<String>) -> TransferResult<Self> {
        let s = s.into();
        if s.len() > MAX_IDENTIFIER_LENGTH {
            return Err(TransferError::InvalidTypeTag(format!(
                "identifier too long: {} bytes (max {})",
                s.len(),
                MAX_IDENTIFIER_LENGTH
            )));
        }
        let Some(first) = s.chars().next() else {
            return Err(TransferError::InvalidTypeTag(
                "identifier cannot be empty".into(),
            ));
        };

        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(TransferError::InvalidTypeTag(format!(
                "identifier must start with letter or underscore: {s}"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TransferError::InvalidTypeTag(format!(
                "identifier contains invalid characters: {s}"
            )));
        }
        Ok(Self(s))
    }

    /// Creates an identifier from a string known to be valid.
    pub(crate) fn from_static(s: &'static str) -> Self {
        debug_assert!(Self::new(s).is_ok(), "invalid static identifier {s}");
        Self(s.to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = TransferError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

/// A Move module identifier (`address::module_name`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveModuleId {
    /// The address where the module is published.
    pub address: AccountAddress,
    /// The name of the module.
    pub name: Identifier,
}

impl MoveModuleId {
    /// Creates a new module ID.
    pub fn new(address: AccountAddress, name: Identifier) -> Self {
        Self { address, name }
    }

    /// Parses a module ID from a string (e.g., "`0x1::coin`").
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not in the format `address::module_name`, the address
    /// is invalid, or the module name is not a valid identifier.
    pub fn from_str_strict(s: &str) -> TransferResult<Self> {
        let parts: Vec<&str> = s.split("::").collect();
        if parts.len() != 2 {
            return Err(TransferError::InvalidTypeTag(format!(
                "invalid module ID format: {s}"
            )));
        }
        let address = AccountAddress::from_str(parts[0])?;
        let name = Identifier::new(parts[1])?;
        Ok(Self { address, name })
    }
}

impl fmt::Display for MoveModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address.to_short_string(), self.name)
    }
}

impl FromStr for MoveModuleId {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

/// A struct tag identifies a specific struct type in Move.
///
/// Format: `address::module::StructName<TypeArg1, TypeArg2, ...>`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    /// The address where the module is published.
    pub address: AccountAddress,
    /// The module name.
    pub module: Identifier,
    /// The struct name.
    pub name: Identifier,
    /// Type arguments (for generic structs).
    pub type_args: Vec<TypeTag>,
}

impl StructTag {
    /// Creates a new struct tag.
    pub fn new(
        address: AccountAddress,
        module: Identifier,
        name: Identifier,
        type_args: Vec<TypeTag>,
    ) -> Self {
        Self {
            address,
            module,
            name,
            type_args,
        }
    }

    /// The `AptosCoin` struct tag (`0x1::aptos_coin::AptosCoin`).
    pub fn aptos_coin() -> Self {
        Self::framework("aptos_coin", "AptosCoin", vec![])
    }

    /// `0x1::coin::CoinStore<coin_type>`.
    pub fn coin_store(coin_type: TypeTag) -> Self {
        Self::framework("coin", "CoinStore", vec![coin_type])
    }

    /// `0x1::account::Account`.
    pub fn account() -> Self {
        Self::framework("account", "Account", vec![])
    }

    fn framework(module: &'static str, name: &'static str, type_args: Vec<TypeTag>) -> Self {
        Self {
            address: AccountAddress::ONE,
            module: Identifier::from_static(module),
            name: Identifier::from_static(name),
            type_args,
        }
    }

    /// Returns true if this tag names `module::name` in the framework at `0x1`,
    /// whatever its type arguments.
    pub fn is_framework_struct(&self, module: &str, name: &str) -> bool {
        self.address == AccountAddress::ONE
            && self.module.as_str() == module
            && self.name.as_str() == name
    }

    /// Parses a struct tag such as `0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidTypeTag`] if `s` parses to anything other
    /// than a struct type.
    pub fn from_str_strict(s: &str) -> TransferResult<Self> {
        match TypeTag::from_str_strict(s)? {
            TypeTag::Struct(tag) => Ok(*tag),
            other => Err(TransferError::InvalidTypeTag(format!(
                "expected a struct type, got {other}"
            ))),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_string(),
            self.module,
            self.name
        )?;
        if !self.type_args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl FromStr for StructTag {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

/// A type tag represents a Move type.
///
/// Variant indices match Move core for canonical encoding:
/// - 0: Bool
/// - 1: U8
/// - 2: U64
/// - 3: U128
/// - 4: Address
/// - 5: Signer
/// - 6: Vector
/// - 7: Struct
/// - 8: U16 (added later)
/// - 9: U32 (added later)
/// - 10: U256 (added later)
///
/// The declaration order is the variant index; new variants go at the end.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// Boolean type (variant 0)
    Bool,
    /// 8-bit unsigned integer (variant 1)
    U8,
    /// 64-bit unsigned integer (variant 2)
    U64,
    /// 128-bit unsigned integer (variant 3)
    U128,
    /// Address type (variant 4)
    Address,
    /// Signer type (variant 5, only valid in certain contexts)
    Signer,
    /// Vector type with element type (variant 6)
    Vector(Box<TypeTag>),
    /// Struct type (variant 7)
    Struct(Box<StructTag>),
    /// 16-bit unsigned integer (variant 8)
    U16,
    /// 32-bit unsigned integer (variant 9)
    U32,
    /// 256-bit unsigned integer (variant 10)
    U256,
}

impl TypeTag {
    /// Creates a vector type tag with the given element type.
    pub fn vector(element: TypeTag) -> Self {
        Self::Vector(Box::new(element))
    }

    /// Creates a struct type tag.
    pub fn struct_tag(tag: StructTag) -> Self {
        Self::Struct(Box::new(tag))
    }

    /// Returns the `AptosCoin` type tag (`0x1::aptos_coin::AptosCoin`).
    pub fn aptos_coin() -> Self {
        Self::Struct(Box::new(StructTag::aptos_coin()))
    }

    /// Parses a type tag from a string.
    ///
    /// Supports primitives (`bool`, `u8` ... `u256`, `address`, `signer`),
    /// `vector<T>`, and struct types with optional generic arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the string exceeds 1024 characters, nests deeper
    /// than 8 levels, or any component is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aptos_transfer::types::TypeTag;
    ///
    /// let tag = TypeTag::from_str_strict("0x1::aptos_coin::AptosCoin").unwrap();
    /// assert_eq!(tag, TypeTag::aptos_coin());
    /// let tag = TypeTag::from_str_strict("vector<u8>").unwrap();
    /// ```
    pub fn from_str_strict(s: &str) -> TransferResult<Self> {
        let s = s.trim();

        if s.len() > MAX_TYPE_TAG_LENGTH {
            return Err(TransferError::InvalidTypeTag(format!(
                "type tag too long: {} bytes (max {})",
                s.len(),
                MAX_TYPE_TAG_LENGTH
            )));
        }

        Self::parse_with_depth(s, 0)
    }

    fn parse_with_depth(s: &str, depth: usize) -> TransferResult<Self> {
        if depth > MAX_TYPE_NESTING_DEPTH {
            return Err(TransferError::InvalidTypeTag(format!(
                "type tag nesting too deep: {depth} levels (max {MAX_TYPE_NESTING_DEPTH})"
            )));
        }

        match s {
            "bool" => return Ok(TypeTag::Bool),
            "u8" => return Ok(TypeTag::U8),
            "u16" => return Ok(TypeTag::U16),
            "u32" => return Ok(TypeTag::U32),
            "u64" => return Ok(TypeTag::U64),
            "u128" => return Ok(TypeTag::U128),
            "u256" => return Ok(TypeTag::U256),
            "address" => return Ok(TypeTag::Address),
            "signer" => return Ok(TypeTag::Signer),
            _ => {}
        }

        if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
            let inner_tag = Self::parse_with_depth(inner.trim(), depth + 1)?;
            return Ok(TypeTag::Vector(Box::new(inner_tag)));
        }

        Self::parse_struct_with_depth(s, depth)
    }

    fn parse_struct_with_depth(s: &str, depth: usize) -> TransferResult<Self> {
        let (base, type_args_str) = match s.find('<') {
            Some(idx) => {
                let Some(args) = s[idx + 1..].strip_suffix('>') else {
                    return Err(TransferError::InvalidTypeTag(format!(
                        "malformed generic type: {s}"
                    )));
                };
                (&s[..idx], Some(args))
            }
            None => (s, None),
        };

        let parts: Vec<&str> = base.split("::").collect();
        if parts.len() != 3 {
            return Err(TransferError::InvalidTypeTag(format!(
                "invalid struct type format (expected address::module::name): {s}"
            )));
        }

        let address = AccountAddress::from_str(parts[0].trim())
            .map_err(|e| TransferError::InvalidTypeTag(format!("{s}: {e}")))?;
        let module = Identifier::new(parts[1])?;
        let name = Identifier::new(parts[2])?;

        let type_args = match type_args_str {
            Some(args) => Self::parse_type_args(args, depth)?,
            None => vec![],
        };

        Ok(TypeTag::Struct(Box::new(StructTag {
            address,
            module,
            name,
            type_args,
        })))
    }

    /// Splits comma-separated type arguments at bracket depth zero.
    fn parse_type_args(s: &str, depth: usize) -> TransferResult<Vec<TypeTag>> {
        if s.trim().is_empty() {
            return Ok(vec![]);
        }

        let mut result = Vec::new();
        let mut bracket_depth: i32 = 0;
        let mut start = 0;

        for (i, c) in s.char_indices() {
            match c {
                '<' => bracket_depth += 1,
                '>' => bracket_depth -= 1,
                ',' if bracket_depth == 0 => {
                    result.push(Self::parse_type_arg(&s[start..i], depth)?);
                    start = i + 1;
                }
                _ => {}
            }
            if bracket_depth < 0 {
                return Err(TransferError::InvalidTypeTag(format!(
                    "unbalanced brackets in type arguments: {s}"
                )));
            }
        }
        if bracket_depth != 0 {
            return Err(TransferError::InvalidTypeTag(format!(
                "unbalanced brackets in type arguments: {s}"
            )));
        }

        result.push(Self::parse_type_arg(&s[start..], depth)?);
        Ok(result)
    }

    fn parse_type_arg(arg: &str, depth: usize) -> TransferResult<TypeTag> {
        let arg = arg.trim();
        if arg.is_empty() {
            return Err(TransferError::InvalidTypeTag(
                "empty type argument".to_string(),
            ));
        }
        Self::parse_with_depth(arg, depth + 1)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}
