//! Company settings record and its partial-update payloads.

use serde::{Deserialize, Serialize};

/// The singleton company settings record.
///
/// Always fully populated: no field is ever absent, and a partial update
/// never leaves a section half-overwritten. Merging happens one level per
/// section; see [`CompanySettings::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub basic_info: BasicInfo,
    pub fiscal_info: FiscalInfo,
    pub branding: Branding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub name: String,
    pub trade_name: String,
    pub cnpj: String,
    pub ie: String,
    pub im: String,
    pub address: Address,
    pub contact: Contact,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub phone: String,
    pub mobile: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    #[default]
    Simples,
    LucroPresumido,
    LucroReal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalInfo {
    pub tax_regime: TaxRegime,
    pub icms_contributor: bool,
    pub iss_contributor: bool,
    pub pis_cofins_taxpayer: bool,
    pub cnae: String,
    pub municipal_registration: String,
    pub state_registration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    /// Empty, a data URI, or an external URL.
    pub logo: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            basic_info: BasicInfo {
                name: "CARNEVALLI ESQUADRIAS LTDA".to_string(),
                trade_name: "Carnevalli Esquadrias".to_string(),
                cnpj: "88.235.288/0001-24".to_string(),
                ie: "0850011930".to_string(),
                im: String::new(),
                address: Address {
                    street: "BUARQUE DE MACEDO".to_string(),
                    number: "2735".to_string(),
                    complement: "PAVILHÃO".to_string(),
                    neighborhood: "CENTRO".to_string(),
                    city: "Nova Prata".to_string(),
                    state: "RS".to_string(),
                    zip_code: "95320-000".to_string(),
                    country: "Brasil".to_string(),
                },
                contact: Contact {
                    phone: "(54) 3242-2072".to_string(),
                    mobile: "(54) 99999-9999".to_string(),
                    email: "carnevalli.esquadrias@gmail.com".to_string(),
                    website: "www.carnevalli.com.br".to_string(),
                },
            },
            fiscal_info: FiscalInfo {
                tax_regime: TaxRegime::Simples,
                icms_contributor: true,
                iss_contributor: true,
                pis_cofins_taxpayer: false,
                cnae: "1622-9/00".to_string(),
                municipal_registration: String::new(),
                state_registration: "0850011930".to_string(),
            },
            branding: Branding {
                logo: String::new(),
                primary_color: "#8B4513".to_string(),
                secondary_color: "#DAA520".to_string(),
                accent_color: "#228B22".to_string(),
            },
        }
    }
}

/// Partial settings update.
///
/// Sections left `None` are untouched. Within a section, present fields
/// win and absent fields keep their current values. `address` and
/// `contact` are whole values: a caller changing one nested field passes
/// the complete sibling-preserving sub-object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanySettingsUpdate {
    pub basic_info: Option<BasicInfoUpdate>,
    pub fiscal_info: Option<FiscalInfoUpdate>,
    pub branding: Option<BrandingUpdate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfoUpdate {
    pub name: Option<String>,
    pub trade_name: Option<String>,
    pub cnpj: Option<String>,
    pub ie: Option<String>,
    pub im: Option<String>,
    pub address: Option<Address>,
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiscalInfoUpdate {
    pub tax_regime: Option<TaxRegime>,
    pub icms_contributor: Option<bool>,
    pub iss_contributor: Option<bool>,
    pub pis_cofins_taxpayer: Option<bool>,
    pub cnae: Option<String>,
    pub municipal_registration: Option<String>,
    pub state_registration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandingUpdate {
    pub logo: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
}

impl CompanySettings {
    /// Shallow per-section merge. The same routine backs live updates and
    /// merging a persisted record over the defaults at load time.
    pub fn apply(&mut self, update: CompanySettingsUpdate) {
        if let Some(section) = update.basic_info {
            self.basic_info.apply(section);
        }
        if let Some(section) = update.fiscal_info {
            self.fiscal_info.apply(section);
        }
        if let Some(section) = update.branding {
            self.branding.apply(section);
        }
    }
}

impl BasicInfo {
    fn apply(&mut self, update: BasicInfoUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(trade_name) = update.trade_name {
            self.trade_name = trade_name;
        }
        if let Some(cnpj) = update.cnpj {
            self.cnpj = cnpj;
        }
        if let Some(ie) = update.ie {
            self.ie = ie;
        }
        if let Some(im) = update.im {
            self.im = im;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(contact) = update.contact {
            self.contact = contact;
        }
    }
}

impl FiscalInfo {
    fn apply(&mut self, update: FiscalInfoUpdate) {
        if let Some(tax_regime) = update.tax_regime {
            self.tax_regime = tax_regime;
        }
        if let Some(icms_contributor) = update.icms_contributor {
            self.icms_contributor = icms_contributor;
        }
        if let Some(iss_contributor) = update.iss_contributor {
            self.iss_contributor = iss_contributor;
        }
        if let Some(pis_cofins_taxpayer) = update.pis_cofins_taxpayer {
            self.pis_cofins_taxpayer = pis_cofins_taxpayer;
        }
        if let Some(cnae) = update.cnae {
            self.cnae = cnae;
        }
        if let Some(municipal_registration) = update.municipal_registration {
            self.municipal_registration = municipal_registration;
        }
        if let Some(state_registration) = update.state_registration {
            self.state_registration = state_registration;
        }
    }
}

impl Branding {
    fn apply(&mut self, update: BrandingUpdate) {
        if let Some(logo) = update.logo {
            self.logo = logo;
        }
        if let Some(primary_color) = update.primary_color {
            self.primary_color = primary_color;
        }
        if let Some(secondary_color) = update.secondary_color {
            self.secondary_color = secondary_color;
        }
        if let Some(accent_color) = update.accent_color {
            self.accent_color = accent_color;
        }
    }
}
