use alloy_primitives::{address, Address};

/// The address of the `L2ToL1MessagePasser` predeploy on every OP Stack chain.
pub const L2_BEDROCK_MESSAGE_PASSER_ADDRESS: Address =
    address!("4200000000000000000000000000000000000016");

/// Returns the output oracle deployment on L1 for the given L2 chain id.
///
/// Local devnets (hardhat ids 31337 and 17) have no fixed deployment and must supply an override
/// address instead.
pub fn oracle_address_by_chain_id(l2_chain_id: u64) -> Option<Address> {
    let address = match l2_chain_id {
        // Optimism mainnet
        10 => address!("dfe97868233d1aa22e815a266982f2cf17685a27"),
        // Optimism Goerli
        420 => address!("E6Dfba0953616Bacab0c9A8ecb3a9BBa77FC15c0"),
        // Optimism Sepolia
        11155420 => address!("90E9c4f8a994a250F6aEfd61CAFb4F2e895D458F"),
        // Optimism Bedrock alpha testnet
        28528 => address!("3A234299a14De50027eA65dCdf1c0DaC729e04A6"),
        // Base mainnet
        8453 => address!("56315b90c40730925ec5485cf004d835058518A0"),
        // Base Goerli
        84531 => address!("2A35891ff30313CcFa6CE88dcf3858bb075A2298"),
        // Base Sepolia
        84532 => address!("84457ca9D0163FbC4bbfe4Dfbb20ba46e48DF254"),
        // Zora Goerli
        999 => address!("dD292C9eEd00f6A32Ff5245d0BCd7f2a15f24e00"),
        // Zora mainnet
        7777777 => address!("9E6204F750cD866b299594e2aC9eA824E2e5f95c"),
        // Lisk Sepolia
        4202 => address!("A0E35F56C318DE1bD5D9ca6A94Fe7e37C5663348"),
        _ => return None,
    };
    Some(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chain_ids_resolve() {
        for chain_id in [10, 420, 11155420, 28528, 8453, 84531, 84532, 999, 7777777, 4202] {
            assert!(oracle_address_by_chain_id(chain_id).is_some(), "chain id {chain_id}");
        }
    }

    #[test]
    fn test_unknown_and_devnet_chain_ids_do_not_resolve() {
        assert!(oracle_address_by_chain_id(1).is_none());
        assert!(oracle_address_by_chain_id(31337).is_none());
        assert!(oracle_address_by_chain_id(17).is_none());
    }

    #[test]
    fn test_mainnet_oracle_address() {
        assert_eq!(
            oracle_address_by_chain_id(10),
            Some(address!("dfe97868233d1aa22e815a266982f2cf17685a27"))
        );
    }
}
