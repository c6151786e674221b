// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::StakeError;
use std::str::FromStr;

/// Size of a raw account address, in bytes
pub const ADDRESS_SIZE_BYTES: usize = 32;

const ADDRESS_PREFIX: char = 'A';

/// Account address, the registry key
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Address([u8; ADDRESS_SIZE_BYTES]);

impl Address {
    /// Builds an address from its raw bytes
    pub const fn from_bytes(data: &[u8; ADDRESS_SIZE_BYTES]) -> Self {
        Address(*data)
    }

    /// Raw bytes of the address
    pub fn to_bytes(&self) -> &[u8; ADDRESS_SIZE_BYTES] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            ADDRESS_PREFIX,
            bs58::encode(self.0).with_check().into_string()
        )
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Address {
    type Err = StakeError;
    /// ## Example
    /// ```rust
    /// # use online_stake_exports::Address;
    /// # use std::str::FromStr;
    /// let address = Address::from_bytes(&[7u8; 32]);
    /// let ser = address.to_string();
    /// let res_addr = Address::from_str(&ser).unwrap();
    /// assert_eq!(address, res_addr);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == ADDRESS_PREFIX => {
                let data = chars.collect::<String>();
                let decoded_bs58_check = bs58::decode(data)
                    .with_check(None)
                    .into_vec()
                    .map_err(|err| StakeError::AddressParse(format!("{}: {}", s, err)))?;
                let bytes: [u8; ADDRESS_SIZE_BYTES] =
                    decoded_bs58_check.as_slice().try_into().map_err(|_| {
                        StakeError::AddressParse(format!(
                            "{}: expected {} bytes, got {}",
                            s,
                            ADDRESS_SIZE_BYTES,
                            decoded_bs58_check.len()
                        ))
                    })?;
                Ok(Address(bytes))
            }
            _ => Err(StakeError::AddressParse(format!(
                "{}: missing prefix {}",
                s, ADDRESS_PREFIX
            ))),
        }
    }
}

impl ::serde::Serialize for Address {
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_string())
        } else {
            s.serialize_bytes(self.to_bytes())
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Address {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        if d.is_human_readable() {
            struct AddressVisitor;

            impl<'de> ::serde::de::Visitor<'de> for AddressVisitor {
                type Value = Address;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("A + base58::encode(address bytes)")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    if let Ok(v_str) = std::str::from_utf8(v) {
                        Address::from_str(v_str).map_err(E::custom)
                    } else {
                        Err(E::invalid_value(::serde::de::Unexpected::Bytes(v), &self))
                    }
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Address::from_str(v).map_err(E::custom)
                }
            }
            d.deserialize_str(AddressVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = Address;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Ok(Address(v.try_into().map_err(E::custom)?))
                }
            }

            d.deserialize_bytes(BytesVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;

    #[test]
    fn test_address_str_format() {
        let address = Address::from_bytes(&[42u8; ADDRESS_SIZE_BYTES]);
        let a = address.to_string();
        assert!(a.starts_with('A'));
        let b = Address::from_str(&a).unwrap();
        assert_eq!(address, b);
    }

    #[test]
    fn test_address_parse_errors() {
        let address = Address::from_bytes(&[1u8; ADDRESS_SIZE_BYTES]).to_string();

        // wrong prefix
        let wrong_prefix = format!("B{}", &address[1..]);
        assert_matches!(
            Address::from_str(&wrong_prefix),
            Err(StakeError::AddressParse(_))
        );

        // corrupted checksum
        let mut corrupted = address.clone();
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == '2' { '3' } else { '2' });
        assert_matches!(Address::from_str(&corrupted), Err(StakeError::AddressParse(_)));

        // wrong length
        let short = format!("A{}", bs58::encode([1u8; 20]).with_check().into_string());
        assert_matches!(Address::from_str(&short), Err(StakeError::AddressParse(_)));
    }

    #[test]
    fn test_address_as_json_map_key() {
        let addr = Address::from_bytes(&[3u8; ADDRESS_SIZE_BYTES]);
        let map = BTreeMap::from([(addr, 12u64)]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, format!("{{\"{}\":12}}", addr));
        let back: BTreeMap<Address, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
