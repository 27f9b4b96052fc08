use rebalancer_math::{less_bps, mul_div_down, pow10};
use rebalancer_types::HostError;

/// Swap venue converting debt token into want at the oracle price
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapSimulator {
    /// Price impact applied to every swap, in bps
    pub slippage_bps: u128,
    pub swaps: u64,
}

impl SwapSimulator {
    /// Want paid for `amount_in` debt token at `price`
    pub fn quote(&self, amount_in: u128, price: u128, want_decimals: u8) -> Result<u128, HostError> {
        if price == 0 {
            return Err(HostError::Swap("zero price".into()));
        }
        let scale = pow10(want_decimals).map_err(|e| HostError::Swap(e.to_string()))?;
        let fair = mul_div_down(amount_in, scale, price).map_err(|e| HostError::Swap(e.to_string()))?;
        less_bps(fair, self.slippage_bps).map_err(|e| HostError::Swap(e.to_string()))
    }

    /// Quote and enforce `min_out`
    pub fn execute(
        &mut self,
        amount_in: u128,
        min_out: u128,
        price: u128,
        want_decimals: u8,
    ) -> Result<u128, HostError> {
        let out = self.quote(amount_in, price, want_decimals)?;
        if out < min_out {
            return Err(HostError::Swap(format!(
                "output {} below minimum {}",
                out, min_out
            )));
        }
        self.swaps += 1;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalancer_types::WAD;

    #[test]
    fn test_slippage_guard() {
        let mut swapper = SwapSimulator {
            slippage_bps: 200,
            swaps: 0,
        };
        let price = 2_000 * WAD;
        assert_eq!(swapper.quote(2_000 * WAD, price, 18).unwrap(), WAD * 98 / 100);
        assert!(swapper.execute(2_000 * WAD, WAD * 99 / 100, price, 18).is_err());
        assert!(swapper.execute(2_000 * WAD, WAD * 98 / 100, price, 18).is_ok());
        assert_eq!(swapper.swaps, 1);
    }
}
