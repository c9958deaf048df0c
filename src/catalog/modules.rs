use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Electrical data of a PV module as listed in the CEC module database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CecModule {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Technology", default)]
    pub technology: Option<String>,
    /// Nameplate power at standard test conditions, W
    #[serde(rename = "STC")]
    pub stc: f64,
    #[serde(rename = "PTC", default)]
    pub ptc: Option<f64>,
    /// Module area, m²
    #[serde(rename = "A_c", default)]
    pub a_c: Option<f64>,
    /// Cells in series
    #[serde(rename = "N_s", default)]
    pub n_s: Option<f64>,
    #[serde(rename = "I_sc_ref", default)]
    pub i_sc_ref: Option<f64>,
    #[serde(rename = "V_oc_ref", default)]
    pub v_oc_ref: Option<f64>,
    #[serde(rename = "I_mp_ref", default)]
    pub i_mp_ref: Option<f64>,
    #[serde(rename = "V_mp_ref", default)]
    pub v_mp_ref: Option<f64>,
    #[serde(rename = "alpha_sc", default)]
    pub alpha_sc: Option<f64>,
    #[serde(rename = "beta_oc", default)]
    pub beta_oc: Option<f64>,
    #[serde(rename = "T_NOCT", default)]
    pub t_noct: Option<f64>,
    /// Power temperature coefficient, %/°C
    #[serde(rename = "gamma_r")]
    pub gamma_r: f64,
}

impl CecModule {
    /// Temperature coefficient in 1/°C
    pub fn gamma_pdc(&self) -> f64 {
        self.gamma_r / 100.0
    }
}

/// Catalog key form of a name: punctuation and blanks become underscores
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '-' | '.' | '(' | ')' | '[' | ']' | ':' | '+' | '/' | '"' | ',' => '_',
            other => other,
        })
        .collect()
}

/// Module tables merged in load order; earlier tables win on duplicate names
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, CecModule>,
}

impl ModuleCatalog {
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut catalog = Self::default();
        for path in paths {
            let path = path.as_ref();
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open module table {}", path.display()))?;
            let added = catalog.extend_from_reader(file)?;
            info!(path = %path.display(), modules = added, "loaded module table");
        }
        Ok(catalog)
    }

    /// Add every parseable row of a CEC module CSV; returns the number of new modules
    pub fn extend_from_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut added = 0;

        for row in rdr.deserialize::<CecModule>() {
            let module = match row {
                Ok(module) => module,
                // Unit and index rows of SAM exports do not parse as numbers
                Err(e) => {
                    debug!("skipping module row: {}", e);
                    continue;
                }
            };

            let key = normalize_name(&module.name);
            if self.modules.contains_key(&module.name) || self.modules.contains_key(&key) {
                continue;
            }
            if key != module.name {
                self.modules.insert(key, module.clone());
            }
            self.modules.insert(module.name.clone(), module);
            added += 1;
        }

        Ok(added)
    }

    pub fn get(&self, name: &str) -> Option<&CecModule> {
        let found = self
            .modules
            .get(name)
            .or_else(|| self.modules.get(&normalize_name(name)));
        if found.is_none() {
            warn!(module = name, "module not found in any catalog");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAM_MODULES: &str = "\
Name,Technology,STC,PTC,A_c,N_s,I_sc_ref,V_oc_ref,I_mp_ref,V_mp_ref,alpha_sc,beta_oc,T_NOCT,gamma_r
Units,,W,W,m2,,A,V,A,V,A/K,V/K,C,%/K
[0],,,,,,,,,,,,,
Canadian Solar Inc. CS6K-280M,Mono-c-Si,280.4,255.0,1.6,60,9.43,38.5,8.87,31.6,0.004,-0.117,45.5,-0.41
Trina Solar TSM-330PD14,Multi-c-Si,330.1,301.9,1.94,72,9.17,46.2,8.72,37.8,0.004,-0.141,46.0,-0.40
";

    const LOCAL_MODULES: &str = "\
Name,STC,gamma_r
Canadian Solar Inc. CS6K-280M,999.0,-0.5
JA Solar JAM72S10 405,405.0,-0.35
";

    #[test]
    fn test_skips_unit_rows() {
        let mut catalog = ModuleCatalog::default();
        let added = catalog.extend_from_reader(SAM_MODULES.as_bytes()).unwrap();
        assert_eq!(added, 2);
        let module = catalog.get("Trina Solar TSM-330PD14").unwrap();
        assert_eq!(module.stc, 330.1);
        assert!((module.gamma_pdc() + 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_lookup() {
        let mut catalog = ModuleCatalog::default();
        catalog.extend_from_reader(SAM_MODULES.as_bytes()).unwrap();
        assert_eq!(normalize_name("Canadian Solar Inc. CS6K-280M"), "Canadian_Solar_Inc__CS6K_280M");
        assert!(catalog.get("Canadian_Solar_Inc__CS6K_280M").is_some());
        assert!(catalog.get("Unknown Module 9000").is_none());
    }

    #[test]
    fn test_first_table_wins() {
        let mut catalog = ModuleCatalog::default();
        catalog.extend_from_reader(SAM_MODULES.as_bytes()).unwrap();
        let added = catalog.extend_from_reader(LOCAL_MODULES.as_bytes()).unwrap();
        assert_eq!(added, 1);
        assert_eq!(catalog.get("Canadian Solar Inc. CS6K-280M").unwrap().stc, 280.4);
        assert_eq!(catalog.get("JA Solar JAM72S10 405").unwrap().stc, 405.0);
    }
}
