//! Command Handlers

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use chrono::Utc;
use shop_core::upsell::offer_days_remaining;
use shop_core::{
    format_usd, AddOutcome, BillingCycle, Breakdown, Cart, Catalog, FileStorage, PricingConfig,
    ShopPage, UpsellBanner,
};
use shop_payments::{CheckoutService, EntitlementGate, GateDecision};
use velocity_finder::{HttpGeocoder, LocationService};

pub struct Context {
    cart: Cart<FileStorage>,
    json: bool,
}

impl Context {
    pub fn open(dir: &Path, json: bool) -> anyhow::Result<Self> {
        let storage = FileStorage::open(dir)
            .with_context(|| format!("opening cart directory {}", dir.display()))?;
        let cart = Cart::load(storage, Arc::new(Catalog::reference()));
        Ok(Self { cart, json })
    }

    pub fn catalog(&self) -> anyhow::Result<()> {
        let catalog = self.cart.catalog();
        if self.json {
            let products: Vec<_> = catalog.iter().collect();
            println!("{}", serde_json::to_string_pretty(&products)?);
            return Ok(());
        }

        for product in catalog.iter() {
            println!(
                "{:<20} {:<48} {:>9}/mo {:>10}/yr{}",
                product.code,
                product.name,
                format_usd(product.monthly_price),
                format_usd(product.annual_price),
                if product.available { "" } else { "  (coming soon)" },
            );
        }
        Ok(())
    }

    pub fn show(&self) -> anyhow::Result<()> {
        let totals = self.cart.compute_totals();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&totals)?);
        } else {
            println!("{}", cart_summary(&totals));
        }
        Ok(())
    }

    pub fn add(&mut self, code: &str, monthly: bool) -> anyhow::Result<()> {
        let cycle = if monthly { BillingCycle::Monthly } else { BillingCycle::Annual };
        match self.cart.add(code, cycle) {
            Ok(AddOutcome::Added) => println!("Added {code} ({cycle})"),
            Ok(AddOutcome::BillingCycleChanged { previous }) => {
                println!("Switched {code} from {previous} to {cycle} billing");
            }
            Ok(AddOutcome::AlreadyInCart) => println!("{code} is already in the cart"),
            Err(e) => bail!("{}", e.user_message()),
        }
        self.show()
    }

    pub fn remove(&mut self, code: &str) -> anyhow::Result<()> {
        self.cart.remove(code)?;
        self.show()
    }

    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.cart.clear()?;
        println!("Cart cleared");
        Ok(())
    }

    pub fn offer(&self, page: &str) -> anyhow::Result<()> {
        let page = parse_page(page)?;
        let days = offer_days_remaining(self.cart.storage(), Utc::now())?;
        let banner = UpsellBanner::for_page(page, self.cart.catalog(), &PricingConfig::default(), days);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&banner)?);
            return Ok(());
        }

        println!("{} ({days} days left)", banner.headline);
        for offer in &banner.offers {
            println!(
                "  {:<24} {:>8} -> {:>8}/mo{}",
                offer.name,
                format_usd(offer.base_monthly_price),
                format_usd(offer.bundle_monthly_price),
                if offer.available { "" } else { "  (coming soon)" },
            );
        }
        Ok(())
    }

    pub async fn checkout(&self) -> anyhow::Result<()> {
        let service = CheckoutService::from_env();
        match service.start_checkout(&self.cart).await {
            Ok(session) => {
                println!("Complete your purchase at:\n{}", session.checkout_url);
                Ok(())
            }
            Err(e) => bail!("{}", e.user_message()),
        }
    }
}

fn parse_page(page: &str) -> anyhow::Result<ShopPage> {
    match page {
        "calculator" | "calculators" => Ok(ShopPage::Calculator),
        "platform" | "bip" => Ok(ShopPage::Platform),
        other => bail!("unknown page {other:?}, expected calculator or platform"),
    }
}

/// Plain-text cart listing with its charge line
fn cart_summary(totals: &Breakdown) -> String {
    if totals.item_count == 0 {
        return "Cart is empty".into();
    }

    let mut lines: Vec<String> = totals
        .items
        .iter()
        .map(|item| {
            format!(
                "{:<24} {:<8} {:>9}/mo",
                item.name,
                item.billing_cycle,
                format_usd(item.normalized_monthly_price)
            )
        })
        .collect();

    lines.push(format!("{:<33} {:>9}/mo", "Subtotal", format_usd(totals.subtotal)));
    if totals.has_bundle_discount {
        let label = format!("Bundle discount ({}%)", totals.bundle_discount_percent.normalize());
        lines.push(format!("{label:<33} {:>9}/mo", format!("-{}", format_usd(totals.bundle_discount))));
    }
    lines.push(format!("{:<33} {:>9}/mo", "Total", format_usd(totals.total)));
    lines.push(format!("Due today: {}", totals.charge_label()));
    lines.join("\n")
}

/// Who a token belongs to and what it unlocks
fn describe_access(decision: &GateDecision) -> String {
    let entitlements = match decision {
        GateDecision::LoginRequired => return "Not signed in".into(),
        GateDecision::SubscriptionRequired(e) | GateDecision::Granted(e) => e,
    };

    let who = if entitlements.claims.email.is_empty() {
        entitlements.claims.user_id.as_str()
    } else {
        entitlements.claims.email.as_str()
    };

    let mut lines = vec![format!("Signed in as {who} ({})", entitlements.tier_label())];
    match decision {
        GateDecision::Granted(_) => {
            let features: Vec<String> = entitlements
                .tier
                .map(|tier| tier.features().iter().map(|f| format!("{f:?}")).collect())
                .unwrap_or_default();
            lines.push(format!("Platform: granted, exports {:?}", entitlements.export_access()));
            if !features.is_empty() {
                lines.push(format!("Features: {}", features.join(", ")));
            }
        }
        _ => lines.push("Platform: subscription required".into()),
    }
    if entitlements.has_calculator {
        lines.push("Calculator: subscribed".into());
    }
    lines.join("\n")
}

pub async fn whoami(token: Option<&str>, return_url: &str, json: bool) -> anyhow::Result<()> {
    let gate = EntitlementGate::from_env();
    let decision = gate.evaluate(token, Utc::now()).await;

    if json {
        let value = match &decision {
            GateDecision::LoginRequired => serde_json::json!({
                "granted": false,
                "loginUrl": gate.login_redirect(return_url)?,
            }),
            GateDecision::SubscriptionRequired(e) | GateDecision::Granted(e) => serde_json::json!({
                "granted": decision.is_granted(),
                "entitlements": e,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", describe_access(&decision));
    if matches!(decision, GateDecision::LoginRequired) {
        println!("Log in at:\n{}", gate.login_redirect(return_url)?);
    }
    Ok(())
}

pub async fn lookup(input: &str, json: bool) -> anyhow::Result<()> {
    let service = LocationService::new(HttpGeocoder::new()?)?;
    let Some(profile) = service.lookup(input).await else {
        bail!("No wind data found for {input:?}");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("{}", profile.jurisdiction);
    println!("  ASCE 7 wind speed: {} mph", profile.asce);
    if profile.has_local_override() {
        println!("  Local requirement: {} mph", profile.local);
    }
    if let Some(note) = &profile.special_requirement {
        println!("  {note}");
    }
    let cc = &profile.cc_requirements;
    println!("  Code: {}", cc.building_code);
    println!(
        "  Nominal pressures: {}",
        cc.nominal_factor
            .filter(|_| cc.allows_nominal)
            .map_or_else(|| "not accepted".to_string(), |f| format!("accepted (x{f})"))
    );
    println!("  {}", cc.special_notes);
    Ok(())
}
