use anyhow::Result;

use referral_program::{ReferralService, SequentialGenerator};

fn main() -> Result<()> {
    println!("🌳 Referral Program - Commission Demo");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Deterministic ids so repeated runs print the same tree
    let service = ReferralService::with_id_generator(Box::new(SequentialGenerator::new("demo")));

    // 1. Referrers
    println!("\n👥 Creating referrers...");
    let company1 = service.create_referrer("Company 1", 0.1);
    let company2 = service.create_referrer("Company 2", 0.05);
    let individual1 = service.create_referrer("Individual 1", 0.02);
    println!("✓ Created {} referrers", service.all_referrers().len());

    // 2. Products
    println!("\n📦 Creating products...");
    let product = service.create_product("Bank Product", 1000.0);
    println!("✓ Created product '{}' at {:.2}", product.name, product.price);

    // 3. Referral tree: one single child, one grouped child
    println!("\n🔗 Building the referral tree...");
    let link1 = service.create_referral_link(&company1.id, &product.id, 0, &[])?;
    let link2 = service.create_referral_link(&company2.id, &product.id, 1, &[])?;
    let link3 = service.create_referral_link(&individual1.id, &product.id, 1, &[])?;
    service.attach_child(&link1.id, &link2.id)?;
    service.attach_child_group(&link1.id, &[link3.id.clone()])?;
    println!("✓ Created {} links", service.all_links().len());

    println!("\n{}", service.render_tree(&link1.id)?);

    // 4. Commission query
    let commission = service.get_commission(&link1.id)?;
    println!("💰 Total commission for {}: {:.2}", link1.id, commission);

    // 5. Clicks accrue to the clicked link's referrer
    println!("\n🖱️  Simulating clicks...");
    for _ in 0..3 {
        let outcome = service.handle_click(&link1.id)?;
        println!(
            "✓ Click {} on {} - referrer balance now {:.2}",
            outcome.clicks, link1.id, outcome.referrer_balance
        );
    }
    let outcome = service.handle_click(&link2.id)?;
    println!(
        "✓ Click {} on {} - referrer balance now {:.2}",
        outcome.clicks, link2.id, outcome.referrer_balance
    );

    // 6. Final balances
    println!("\n📊 Final balances:");
    for referrer in service.all_referrers() {
        println!("   {:<14} {:>10.2}", referrer.name, referrer.balance);
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Demo complete");

    Ok(())
}
