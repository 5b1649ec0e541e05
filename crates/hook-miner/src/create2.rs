use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::SolValue;

/// 0xff ++ deployer (20) ++ salt (32) ++ init code hash (32)
const PREIMAGE_LEN: usize = 1 + 20 + 32 + 32;
const SALT_OFFSET: usize = 1 + 20;

/// Hash of the exact bytes a CREATE2 deployment broadcasts: creation code
/// followed by the ABI-encoded constructor arguments.
pub fn init_code_hash(creation_code: &[u8], constructor_args: &[u8]) -> B256 {
    let mut init_code = Vec::with_capacity(creation_code.len() + constructor_args.len());
    init_code.extend_from_slice(creation_code);
    init_code.extend_from_slice(constructor_args);
    keccak256(init_code)
}

pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut bytes = Vec::with_capacity(PREIMAGE_LEN);
    bytes.push(0xff);
    bytes.extend_from_slice(deployer.as_slice());
    bytes.extend_from_slice(salt.as_slice());
    bytes.extend_from_slice(init_code_hash.as_slice());

    let hash = keccak256(bytes.as_slice());

    // Take the last 20 bytes
    Address::from_slice(&hash[12..])
}

/// ABI-encodes a constructor whose parameters are all addresses, e.g.
/// `constructor(IPoolManager manager)`. Each address fills one 32 byte word.
pub fn encode_address_args(args: &[Address]) -> Vec<u8> {
    args.iter().flat_map(|arg| arg.abi_encode()).collect()
}

/// Reuses one preimage buffer across attempts; only the salt bytes change
/// between candidates.
#[derive(Clone)]
pub struct Create2Hasher {
    preimage: [u8; PREIMAGE_LEN],
}

impl Create2Hasher {
    pub fn new(deployer: Address, init_code_hash: B256) -> Self {
        let mut preimage = [0u8; PREIMAGE_LEN];
        preimage[0] = 0xff;
        preimage[1..SALT_OFFSET].copy_from_slice(deployer.as_slice());
        preimage[SALT_OFFSET + 32..].copy_from_slice(init_code_hash.as_slice());
        Self { preimage }
    }

    #[inline]
    pub fn address(&mut self, salt: &B256) -> Address {
        self.preimage[SALT_OFFSET..SALT_OFFSET + 32].copy_from_slice(salt.as_slice());
        Address::from_slice(&keccak256(self.preimage)[12..])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::{address, b256, U256};
    use hex_literal::hex;

    #[test]
    fn test_eip1014_vector() {
        let address = create2_address(Address::ZERO, B256::ZERO, keccak256(hex!("00")));
        assert_eq!(address, address!("4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38"));
    }

    #[test]
    fn test_matches_alloy_create2() {
        let deployer = address!("4e59b44847b379578588920cA78FbF26c0B4956C");
        let hash = keccak256(b"hook");

        for i in [0u64, 1, 0x2b31, u64::MAX] {
            let salt = B256::from(U256::from(i));
            assert_eq!(
                create2_address(deployer, salt, hash),
                deployer.create2(salt, hash)
            );
        }
    }

    #[test]
    fn test_hasher_agrees_with_create2_address() {
        let deployer = address!("4e59b44847b379578588920cA78FbF26c0B4956C");
        let hash = init_code_hash(&hex!("6080604052"), &[]);
        let mut hasher = Create2Hasher::new(deployer, hash);

        for i in 0u64..64 {
            let salt = B256::from(U256::from(i));
            assert_eq!(hasher.address(&salt), create2_address(deployer, salt, hash));
        }
    }

    #[test]
    fn test_init_code_hash_concatenates() {
        let creation_code = hex!("6080604052348015600f57600080fd5b50");
        let args = encode_address_args(&[address!("000000000004444c5dc75cB358380D2e3dE08A90")]);

        assert_eq!(args.len(), 32);
        assert_eq!(&args[..12], &[0u8; 12]);
        assert_eq!(
            init_code_hash(&creation_code, &args),
            b256!("7cd88fcdd9b467ed75adda4b19ee2b8e4b1cd3c5b2fe03e951a2b85ad29adba2")
        );
        assert_eq!(
            init_code_hash(&creation_code, &args),
            keccak256([creation_code.as_slice(), args.as_slice()].concat())
        );
    }
}
