//! Invoice calculation: line sums, discounts, charges, tax totals, outlays
//! and payment settlement.
//!
//! [`Invoice::calculate`] always rebuilds [`Totals`] from scratch, so running
//! it twice on the same input produces identical output.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::error::BillingError;
use super::percent::{Percent, round_half_up};
use super::types::*;
use crate::dispatch;
use crate::tax::{
    AddonDef, Combo, Regime, Registry, ScenarioSet, ScenarioSummary, TAG_CUSTOMER_RATES,
    TAG_REVERSE_CHARGE, TaxableLine, TotalCalculator, scenario,
};

impl TaxableLine for Line {
    fn tax_combos(&self) -> &[Combo] {
        &self.taxes
    }

    fn taxable_amount(&self) -> Decimal {
        self.total
    }
}

impl TaxableLine for Discount {
    fn tax_combos(&self) -> &[Combo] {
        &self.taxes
    }

    fn taxable_amount(&self) -> Decimal {
        -self.amount
    }
}

impl TaxableLine for Charge {
    fn tax_combos(&self) -> &[Combo] {
        &self.taxes
    }

    fn taxable_amount(&self) -> Decimal {
        self.amount
    }
}

impl Line {
    /// Calculate `sum` and `total`. No rounding happens here: the sum is
    /// the exact product of price and quantity.
    pub fn calculate(&mut self) -> Result<(), BillingError> {
        self.sum = checked(self.item.price.checked_mul(self.quantity), "sum")?;
        let discount = match &mut self.discount {
            Some(d) => {
                if let Some(p) = d.percent.filter(|p| !p.is_zero()) {
                    d.amount = checked(p.of(self.sum), "discount.amount")?;
                }
                d.amount
            }
            None => Decimal::ZERO,
        };
        self.total = checked(self.sum.checked_sub(discount), "total")?;
        Ok(())
    }

    fn remove_included_taxes(&mut self, category: &str) {
        let Some(p) = included_percent(&self.taxes, category) else {
            return;
        };
        let accuracy = self.item.price.scale() + integer_digits(self.quantity);
        if let Some(price) = p.remove_from_at(self.item.price, accuracy) {
            self.item.price = price;
        }
        if let Some(d) = &mut self.discount {
            remove_included(&mut d.amount, p);
        }
    }
}

/// Strip `p` from an amount at one extra decimal place. Amounts the
/// percent cannot be removed from (-100%) are left untouched.
fn remove_included(amount: &mut Decimal, p: Percent) {
    if let Some(net) = p.remove_from_at(*amount, amount.scale() + 1) {
        *amount = net;
    }
}

/// The regime's invoice scenarios followed by those of each active addon.
fn scenario_sets<'a>(
    regime: &'a Regime,
    addons: &'a [&'a AddonDef],
) -> impl Iterator<Item = &'a ScenarioSet> {
    regime
        .scenario_set(Invoice::SHORT_SCHEMA)
        .into_iter()
        .chain(addons.iter().filter_map(|a| a.scenario_set(Invoice::SHORT_SCHEMA)))
}

/// Turn an overflowed checked operation into an error naming `field`.
fn checked(value: Option<Decimal>, field: &str) -> Result<Decimal, BillingError> {
    value.ok_or_else(|| BillingError::AmountOverflow(field.to_string()))
}

fn included_percent(combos: &[Combo], category: &str) -> Option<Percent> {
    combos
        .iter()
        .find(|c| c.category == category)
        .and_then(|c| c.percent)
}

/// Number of digits in the integer part of `value`, ignoring the sign.
fn integer_digits(value: Decimal) -> u32 {
    let int = value.abs().trunc().normalize();
    if int.is_zero() {
        0
    } else {
        int.to_string().len() as u32
    }
}

impl Party {
    /// Normalize derived fields, currently the tax identity.
    pub fn calculate(&mut self) {
        if let Some(id) = &mut self.tax_id {
            id.normalize();
        }
    }
}

impl TaxIdentity {
    /// Upper-case the country and strip separators and a leading country
    /// prefix from the code (`"nl 0000.00.000-B01"` → `"000000000B01"`).
    pub fn normalize(&mut self) {
        self.country = self.country.trim().to_uppercase();
        if let Some(code) = &self.code {
            let mut clean: String = code
                .chars()
                .filter(|c| !matches!(c, ' ' | '.' | '-' | '/' | ','))
                .collect::<String>()
                .to_uppercase();
            if let Some(rest) = clean.strip_prefix(self.country.as_str()) {
                clean = rest.to_string();
            }
            self.code = (!clean.is_empty()).then_some(clean);
        }
    }
}

impl Payment {
    fn calculate_advances(&mut self, total_with_tax: Decimal) -> Result<(), BillingError> {
        for advance in &mut self.advances {
            if let Some(p) = advance.percent {
                advance.amount = checked(p.of(total_with_tax), "payment.advances.amount")?;
            }
        }
        Ok(())
    }

    /// Sum of all advances, or `None` when there are none.
    pub fn total_advance(&self, zero: Decimal) -> Result<Option<Decimal>, BillingError> {
        if self.advances.is_empty() {
            return Ok(None);
        }
        let mut total = zero;
        for a in &self.advances {
            total = checked(total.checked_add(a.amount), "totals.advances")?;
        }
        Ok(Some(total))
    }

    pub fn reset_advances(&mut self) {
        self.advances.clear();
    }
}

impl Terms {
    /// Set the amount of every percentage-based due date from `payable`.
    pub fn calculate_dues(&mut self, payable: Decimal) -> Result<(), BillingError> {
        for due in &mut self.due_dates {
            if let Some(p) = due.percent {
                due.amount = checked(p.of(payable), "payment.terms.due_dates.amount")?;
            }
        }
        Ok(())
    }
}

impl Invoice {
    /// Short schema name used to select scenario sets.
    pub const SHORT_SCHEMA: &'static str = "bill/invoice";

    /// Calculate every derived field and replace [`Invoice::totals`].
    ///
    /// Runs the active addons' normalizers, validates tags, applies scenario
    /// notes and extension codes, resolves the regime and computes totals.
    /// On error `totals` is left as it was.
    pub fn calculate(&mut self, registry: &Registry) -> Result<(), BillingError> {
        let supplier = self.supplier.as_mut().ok_or(BillingError::MissingSupplier)?;
        supplier.calculate();
        if let Some(customer) = self.customer.as_mut() {
            customer.calculate();
        }

        let addons = registry.addons_for(&self.addons)?;
        dispatch::normalize(self, &addons);

        self.prepare_tags_and_scenarios(registry, &addons)?;

        let identity = self.determine_tax_identity()?;
        let (country, zone) = (identity.country.clone(), identity.zone.clone());
        let regime = registry.regime_for(&country, zone.as_deref()).ok_or_else(|| {
            BillingError::UnknownRegime {
                country: country.clone(),
                zone: zone.clone(),
            }
        })?;
        debug!(country = %country, zone = ?zone, regime = %regime.name, "tax regime resolved");

        self.calculate_totals(regime, zone.as_deref())
    }

    /// The regime of the supplier's tax identity, if registered.
    pub fn tax_regime<'r>(&self, registry: &'r Registry) -> Option<&'r Regime> {
        let id = self.supplier.as_ref()?.tax_id.as_ref()?;
        registry.regime_for(&id.country, id.zone.as_deref())
    }

    /// Scenarios matching the invoice's type and tags under the supplier's
    /// regime and any registered addons it lists.
    pub fn scenario_summary(&self, registry: &Registry) -> Option<ScenarioSummary> {
        let regime = self.tax_regime(registry)?;
        let addons: Vec<&AddonDef> = self.addons.iter().filter_map(|k| registry.addon(k)).collect();
        Some(self.summary_for(regime, &addons))
    }

    fn summary_for(&self, regime: &Regime, addons: &[&AddonDef]) -> ScenarioSummary {
        let tags = self.tax.as_ref().map(|t| t.tags.as_slice()).unwrap_or_default();
        scenario::resolve(self.type_.key(), tags, scenario_sets(regime, addons))
    }

    fn prepare_tags_and_scenarios(
        &mut self,
        registry: &Registry,
        addons: &[&AddonDef],
    ) -> Result<(), BillingError> {
        let Some(regime) = self.tax_regime(registry) else {
            return Ok(());
        };

        if let Some(tax) = &self.tax {
            for tag in &tax.tags {
                let known =
                    regime.tag(tag).is_some() || addons.iter().any(|a| a.tag(tag).is_some());
                if !known {
                    return Err(BillingError::InvalidTag(tag.clone()));
                }
            }
        }

        let summary = self.summary_for(regime, addons);
        for note in summary.notes {
            if self.notes.iter().any(|n| n.src == note.src) {
                continue;
            }
            debug!(src = ?note.src, "scenario note added");
            self.notes.push(note);
        }
        // Scenario-owned codes are recomputed so a changed type or tag set
        // never leaves a stale code behind.
        if let Some(tax) = &mut self.tax {
            for key in scenario_sets(regime, addons).flat_map(|set| set.ext_keys()) {
                tax.ext.remove(key);
            }
        }
        if !summary.ext.is_empty() {
            let tax = self.tax.get_or_insert_with(Tax::default);
            tax.ext.extend(summary.ext);
        }
        Ok(())
    }

    fn determine_tax_identity(&self) -> Result<&TaxIdentity, BillingError> {
        let customer_rates = self
            .tax
            .as_ref()
            .is_some_and(|t| t.contains_tag(TAG_CUSTOMER_RATES));
        if customer_rates {
            return self
                .customer
                .as_ref()
                .and_then(|c| c.tax_id.as_ref())
                .ok_or_else(|| {
                    BillingError::UnresolvableTaxIdentity(
                        "customer rates require a customer with a tax identity".into(),
                    )
                });
        }
        self.supplier
            .as_ref()
            .and_then(|s| s.tax_id.as_ref())
            .ok_or_else(|| {
                BillingError::UnresolvableTaxIdentity("supplier has no tax identity".into())
            })
    }

    fn calculate_totals(&mut self, regime: &Regime, zone: Option<&str>) -> Result<(), BillingError> {
        let date = self
            .value_date
            .or(self.issue_date)
            .ok_or(BillingError::MissingDate)?;
        let zero = regime.currency_base_amount();
        let dp = zero.scale();

        let combos = self
            .lines
            .iter_mut()
            .flat_map(|l| l.taxes.iter_mut())
            .chain(self.discounts.iter_mut().flat_map(|d| d.taxes.iter_mut()))
            .chain(self.charges.iter_mut().flat_map(|c| c.taxes.iter_mut()));
        for combo in combos {
            combo.prepare(regime, zone, date)?;
        }

        let mut sum = zero;
        for (i, line) in self.lines.iter_mut().enumerate() {
            line.index = i + 1;
            line.calculate()?;
            sum = checked(sum.checked_add(line.total), "totals.sum")?;
        }
        let sum = round_half_up(sum, dp);

        let mut discounts = zero;
        for (i, d) in self.discounts.iter_mut().enumerate() {
            d.index = i + 1;
            if let Some(p) = d.percent.filter(|p| !p.is_zero()) {
                d.amount = checked(p.of(d.base.unwrap_or(sum)), "discounts.amount")?;
            }
            discounts = checked(discounts.checked_add(d.amount), "totals.discount")?;
        }
        let discounts = round_half_up(discounts, dp);

        let mut charges = zero;
        for (i, c) in self.charges.iter_mut().enumerate() {
            c.index = i + 1;
            if let Some(p) = c.percent.filter(|p| !p.is_zero()) {
                c.amount = checked(p.of(c.base.unwrap_or(sum)), "charges.amount")?;
            }
            charges = checked(charges.checked_add(c.amount), "totals.charge")?;
        }
        let charges = round_half_up(charges, dp);

        let mut total = checked(
            sum.checked_sub(discounts).and_then(|t| t.checked_add(charges)),
            "totals.total",
        )?;

        let includes = self.tax.as_ref().and_then(|t| t.prices_include.clone());
        let taxes = {
            let mut lines: Vec<&dyn TaxableLine> = Vec::new();
            lines.extend(self.lines.iter().map(|l| l as &dyn TaxableLine));
            lines.extend(self.discounts.iter().map(|d| d as &dyn TaxableLine));
            lines.extend(self.charges.iter().map(|c| c as &dyn TaxableLine));
            TotalCalculator {
                zero,
                regime,
                zone,
                date,
                includes: includes.as_deref(),
                lines,
            }
            .calculate()?
        };

        let tax_included = includes
            .as_deref()
            .and_then(|code| taxes.category(code))
            .map(|c| c.amount);
        if let Some(included) = tax_included {
            total = checked(total.checked_sub(included), "totals.total")?;
        }

        let reverse_charge = self
            .tax
            .as_ref()
            .is_some_and(|t| t.contains_tag(TAG_REVERSE_CHARGE));
        let tax = if reverse_charge {
            trace!(computed = %taxes.sum, "reverse charge, tax forced to zero");
            zero
        } else {
            taxes.sum
        };
        let total_with_tax = checked(total.checked_add(tax), "totals.total_with_tax")?;
        let mut payable = total_with_tax;

        let outlays = if self.outlays.is_empty() {
            None
        } else {
            let mut amount = zero;
            for (i, o) in self.outlays.iter_mut().enumerate() {
                o.index = i + 1;
                amount = checked(amount.checked_add(o.amount), "totals.outlays")?;
            }
            Some(amount)
        };
        if let Some(o) = outlays {
            payable = checked(payable.checked_add(o), "totals.payable")?;
        }

        let mut advances = None;
        let mut due = None;
        if let Some(payment) = &mut self.payment {
            payment.calculate_advances(total_with_tax)?;
            advances = payment.total_advance(zero)?;
            if let Some(a) = advances {
                due = Some(checked(payable.checked_sub(a), "totals.due")?);
            }
            if let Some(terms) = &mut payment.terms {
                terms.calculate_dues(payable)?;
            }
        }

        let totals = Totals {
            sum,
            discount: (!discounts.is_zero()).then_some(discounts),
            charge: (!charges.is_zero()).then_some(charges),
            tax_included,
            total,
            taxes: (!taxes.categories.is_empty()).then_some(taxes),
            tax,
            total_with_tax,
            outlays,
            payable,
            advances,
            due,
        };
        debug!(
            code = %self.code,
            sum = %totals.sum,
            tax = %totals.tax,
            payable = %totals.payable,
            "totals calculated"
        );
        self.totals = Some(totals);
        Ok(())
    }

    /// A copy of the invoice with the included tax removed from every
    /// price and amount, for the category named in `tax.prices_include`.
    ///
    /// Combos must carry their resolved percent, so call this after
    /// [`Invoice::calculate`]. Line prices keep extra precision derived
    /// from the size of the quantity; other amounts gain one decimal place.
    pub fn remove_included_taxes(&self) -> Invoice {
        let mut out = self.clone();
        let Some(category) = self.tax.as_ref().and_then(|t| t.prices_include.as_deref()) else {
            return out;
        };

        for line in &mut out.lines {
            line.remove_included_taxes(category);
        }
        for d in &mut out.discounts {
            if let Some(p) = included_percent(&d.taxes, category) {
                remove_included(&mut d.amount, p);
            }
        }
        for c in &mut out.charges {
            if let Some(p) = included_percent(&c.taxes, category) {
                remove_included(&mut c.amount, p);
            }
        }
        if let Some(tax) = &mut out.tax {
            tax.prices_include = None;
        }
        out
    }

    /// Flip the sign of every quantity and amount, e.g. to turn an invoice
    /// into the body of a credit note. Totals are cleared.
    pub fn invert(&mut self) {
        for line in &mut self.lines {
            line.quantity = -line.quantity;
        }
        for d in &mut self.discounts {
            d.amount = -d.amount;
        }
        for c in &mut self.charges {
            c.amount = -c.amount;
        }
        for o in &mut self.outlays {
            o.amount = -o.amount;
        }
        if let Some(payment) = &mut self.payment {
            for a in &mut payment.advances {
                a.amount = -a.amount;
            }
        }
        self.totals = None;
    }

    /// Remove all lines, adjustments, advances and totals.
    pub fn empty(&mut self) {
        self.lines.clear();
        self.discounts.clear();
        self.charges.clear();
        self.outlays.clear();
        if let Some(payment) = &mut self.payment {
            payment.reset_advances();
        }
        self.totals = None;
    }
}
