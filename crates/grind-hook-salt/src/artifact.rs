//! Loading creation bytecode.
//!
//! Accepts a Foundry artifact (`out/Hook.sol/Hook.json`, bytecode under
//! `bytecode.object`), a Hardhat artifact (`bytecode` as a string), a file of
//! raw hex, or a hex literal.

use std::fs;
use std::path::Path;

use eyre::{bail, Result, WrapErr};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Foundry { object: String },
    Hardhat(String),
}

#[derive(Deserialize)]
struct Artifact {
    bytecode: BytecodeField,
}

pub fn load_artifact(path: &Path) -> Result<Vec<u8>> {
    let json = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read artifact {}", path.display()))?;
    creation_code_from_artifact(&json)
        .wrap_err_with(|| format!("failed to load bytecode from {}", path.display()))
}

pub fn creation_code_from_artifact(json: &str) -> Result<Vec<u8>> {
    let artifact: Artifact = serde_json::from_str(json).wrap_err("not a contract artifact")?;
    let object = match artifact.bytecode {
        BytecodeField::Foundry { object } => object,
        BytecodeField::Hardhat(object) => object,
    };
    let code = decode_hex(&object)?;
    if code.is_empty() {
        bail!("artifact has no creation bytecode (abstract contract or interface?)");
    }
    Ok(code)
}

/// `@path` reads the hex from a file, anything else is parsed as hex.
pub fn load_bytecode(arg: &str) -> Result<Vec<u8>> {
    match arg.strip_prefix('@') {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read bytecode file {path}"))?;
            decode_hex(&contents)
        }
        None => decode_hex(arg),
    }
}

pub fn decode_hex(raw: &str) -> Result<Vec<u8>> {
    let trimmed: String = raw.split_whitespace().collect();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed.as_str());

    // solc leaves `__$<hash>$__` where an external library address belongs
    if digits.contains("__") {
        bail!("bytecode has unlinked library placeholders; link libraries before mining");
    }
    hex::decode(digits).wrap_err("invalid hex")
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_foundry_artifact() {
        let json = r#"{
            "abi": [],
            "bytecode": {
                "object": "0x6080604052348015600f57600080fd5b50",
                "sourceMap": "",
                "linkReferences": {}
            },
            "deployedBytecode": { "object": "0x6080" }
        }"#;

        assert_eq!(
            creation_code_from_artifact(json).unwrap(),
            hex!("6080604052348015600f57600080fd5b50")
        );
    }

    #[test]
    fn test_hardhat_artifact() {
        let json = r#"{ "contractName": "PerpsHook", "bytecode": "0x60806040" }"#;
        assert_eq!(
            creation_code_from_artifact(json).unwrap(),
            hex!("60806040")
        );
    }

    #[test]
    fn test_interface_artifact_rejected() {
        let json = r#"{ "bytecode": { "object": "0x" } }"#;
        assert!(creation_code_from_artifact(json).is_err());
    }

    #[test]
    fn test_unlinked_placeholder_rejected() {
        let err = decode_hex("0x6080__$a1b2c3$__6040").unwrap_err();
        assert!(err.to_string().contains("unlinked"));
    }

    #[test]
    fn test_decode_hex_tolerates_whitespace() {
        assert_eq!(decode_hex(" 0x60 80\n6040\n").unwrap(), hex!("60806040"));
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
        assert!(decode_hex("0xzz").is_err());
    }
}
