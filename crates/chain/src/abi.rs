use alloy_sol_types::sol;

sol! {
    /// The pre-fault-proof output oracle. Proposers append output proposals to the contract and
    /// anyone may read them back by index during the finalization window.
    #[sol(rpc)]
    #[derive(Debug, PartialEq)]
    contract L2OutputOracle {
        /// An output proposal as stored by the oracle.
        struct OutputProposal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2BlockNumber;
        }

        /// The index the next submitted output will receive.
        function nextOutputIndex() external view returns (uint256);

        /// Returns the output proposal at the given index. Reverts when the index has not been
        /// proposed yet.
        function getL2Output(uint256 _l2OutputIndex) external view returns (OutputProposal memory);

        /// The challenge window in seconds during which an output may be disputed.
        function FINALIZATION_PERIOD_SECONDS() external view returns (uint256);
    }
}
