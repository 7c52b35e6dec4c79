//! Solidity interfaces of the faucet tokens and the swap router.

use alloy_sol_types::sol;

sol!(
    /// PING / PONG test tokens. `mint` hands out one faucet allocation per
    /// address and flips `isMinter` for it.
    interface IFaucetToken {
        function mint() external payable;
        function balanceOf(address owner) external view returns (uint256);
        function isMinter(address account) external view returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
);

sol!(
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams params) external payable returns (uint256 amountOut);
    }
);
