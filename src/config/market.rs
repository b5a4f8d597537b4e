//! NEPSE watchlist: sectors, symbols and reference prices used to seed the simulator.

/// One sector of the watchlist
pub struct Sector {
    pub name: &'static str,
    pub symbols: &'static [&'static str],
}

/// The Master Market Configuration
pub struct MarketConfig {
    pub exchange: &'static str,
    pub sectors: &'static [Sector],
    /// Last known reference prices. Symbols missing here (or listed at 0)
    /// start at `fallback_price`.
    pub base_prices: &'static [(&'static str, f64)],
    pub fallback_price: f64,
    /// Symbol selected when nothing else is requested
    pub default_symbol: &'static str,
}

impl MarketConfig {
    /// Every symbol in sector order, without duplicates.
    pub fn all_symbols(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for sector in self.sectors {
            for symbol in sector.symbols {
                if !out.contains(symbol) {
                    out.push(symbol);
                }
            }
        }
        out
    }

    pub fn base_price(&self, symbol: &str) -> f64 {
        self.base_prices
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, p)| *p)
            .filter(|p| *p > 0.0)
            .unwrap_or(self.fallback_price)
    }

    pub fn sector_of(&self, symbol: &str) -> Option<&'static str> {
        self.sectors
            .iter()
            .find(|s| s.symbols.iter().any(|x| x.eq_ignore_ascii_case(symbol)))
            .map(|s| s.name)
    }
}

pub const MARKET: MarketConfig = MarketConfig {
    exchange: "NEPSE",
    default_symbol: "NABIL",
    fallback_price: 100.0,

    sectors: &[
        Sector {
            name: "Banks",
            symbols: &[
                "NABIL", "NMB", "NICA", "GBIME", "EBL", "HBL", "NIBL", "PCBL", "SBL", "SCB",
                "ADBL", "CZBIL", "MBL", "KBL", "LBL", "SANIMA", "PRVU", "BOKL", "MEGA", "SRBL",
            ],
        },
        Sector {
            name: "Development & Finance",
            symbols: &[
                "MNBBL", "JBBL", "GBBL", "SHINE", "SADBL", "CORBL", "SAPDBL", "MLBL", "KSBBL",
                "UDBL", "GUFL", "PFL", "MFIL", "CFCL", "ICFC", "BFCL", "SFCL",
            ],
        },
        Sector {
            name: "Insurance",
            symbols: &[
                "NLIC", "LICN", "ALICL", "PLIC", "RLICL", "SLICL", "SNLI", "ILI", "ULI", "NICL",
                "SICL", "NIL", "PRIN", "IGI", "SALICO", "SGIC", "SPIL", "HEI", "RBCL",
            ],
        },
        Sector {
            name: "Hydropower",
            symbols: &[
                "CHCL", "BPCL", "NHPC", "SHPC", "RADHI", "SAHAS", "UPCL", "UNHPL", "AKPL", "API",
                "NGPL", "NYADI", "DHPL", "RHPL", "HPPL", "AHPC",
            ],
        },
        Sector {
            name: "Manufacturing & Others",
            symbols: &[
                "CIT", "HIDCL", "NIFRA", "NRN", "HATHY", "ENL", "UNL", "HDL", "SHIVM", "BNT",
                "BNL", "SARBTM", "GCIL", "SONA", "NLO", "OMPL", "STC", "BBC", "NTC", "OHL", "TRH",
                "YHL",
            ],
        },
    ],

    base_prices: &[
        ("NABIL", 498.6), ("NMB", 235.1), ("NICA", 321.0), ("GBIME", 228.0), ("EBL", 647.29),
        ("HBL", 187.9), ("NIBL", 0.0), ("PCBL", 257.0), ("SBL", 374.9), ("SCB", 624.79),
        ("ADBL", 288.0), ("CZBIL", 191.5), ("MBL", 220.0), ("KBL", 178.4), ("LBL", 173.0),
        ("SANIMA", 319.0), ("PRVU", 182.0), ("BOKL", 207.3), ("MEGA", 219.0), ("SRBL", 173.1),
        ("MNBBL", 342.6), ("JBBL", 318.0), ("GBBL", 374.0), ("SHINE", 391.0), ("SADBL", 381.0),
        ("CORBL", 1450.0), ("SAPDBL", 793.1), ("MLBL", 354.5), ("KSBBL", 429.5), ("GUFL", 486.0),
        ("PFL", 358.0), ("MFIL", 709.0), ("CFCL", 462.1), ("ICFC", 620.0), ("BFCL", 165.0),
        ("SFCL", 375.0), ("NLIC", 750.5), ("LICN", 876.0), ("ALICL", 457.0), ("PLIC", 340.0),
        ("SLICL", 387.0), ("SNLI", 504.0), ("ILI", 442.0), ("ULI", 393.8), ("NICL", 504.9),
        ("SICL", 635.0), ("NIL", 602.5), ("PRIN", 657.0), ("IGI", 414.0), ("SALICO", 600.3),
        ("SGIC", 472.0), ("SPIL", 740.0), ("HEI", 500.0), ("RBCL", 14940.0), ("CHCL", 498.0),
        ("BPCL", 714.0), ("NHPC", 190.8), ("SHPC", 515.0), ("RADHI", 730.0), ("SAHAS", 543.0),
        ("UPCL", 359.0), ("UNHPL", 481.5), ("AKPL", 244.0), ("API", 289.0), ("NGPL", 387.5),
        ("NYADI", 370.0), ("DHPL", 288.0), ("RHPL", 268.8), ("HPPL", 472.0), ("CIT", 1809.5),
        ("HIDCL", 254.5), ("NIFRA", 261.2), ("NRN", 1345.2), ("HATHY", 886.9), ("ENL", 890.0),
        ("UNL", 47200.0), ("HDL", 1132.2), ("SHIVM", 575.0), ("BNT", 11952.0), ("BNL", 15904.9),
        ("SARBTM", 865.0), ("GCIL", 405.3), ("SONA", 414.8), ("NLO", 254.1), ("OMPL", 1239.0),
        ("STC", 5405.0), ("BBC", 4864.0), ("NTC", 895.4), ("OHL", 691.1), ("TRH", 708.0),
        ("YHL", 600.0), ("AHPC", 272.3),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_price_lookup() {
        assert_eq!(MARKET.base_price("NABIL"), 498.6);
        assert_eq!(MARKET.base_price("nabil"), 498.6);
        // Listed at zero and not listed at all both fall back
        assert_eq!(MARKET.base_price("NIBL"), 100.0);
        assert_eq!(MARKET.base_price("UDBL"), 100.0);
    }

    #[test]
    fn test_symbols_unique_and_sectored() {
        let all = MARKET.all_symbols();
        assert_eq!(all.first(), Some(&"NABIL"));
        let mut dedup = all.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), all.len());
        assert_eq!(MARKET.sector_of("CHCL"), Some("Hydropower"));
        assert_eq!(MARKET.sector_of("XYZ"), None);
    }
}
