//! Random generation commands: `/random number`, `/random coin` and `/random dice`.

use crate::core::random::{CoinSide, die_face};
use poise::serenity_prelude as serenity;

use super::general::INFO_COLOR;

/// Message for `/random number`.
#[must_use]
pub fn number_message(min: i64, max: i64, value: i64) -> String {
    format!("🎲 Random number between {min} and {max}: **{value}**")
}

/// Embed for `/random coin`.
#[must_use]
pub fn coin_embed(side: CoinSide) -> serenity::CreateEmbed {
    serenity::CreateEmbed::default()
        .title("Coin Flip")
        .description(format!("{} **{}**", side.emoji(), side.label()))
        .color(INFO_COLOR)
}

/// Embed for `/random dice`.
#[must_use]
pub fn dice_embed(sides: u32, value: u32) -> serenity::CreateEmbed {
    serenity::CreateEmbed::default()
        .title(format!("Dice Roll (d{sides})"))
        .description(format!("{} You rolled a **{value}**", die_face(sides, value)))
        .color(INFO_COLOR)
}

mod inner {
    #![allow(missing_docs)]

    use super::{coin_embed, dice_embed, number_message};
    use crate::{
        bot::{BotData, say_ephemeral},
        core::random::{
            DEFAULT_MAX, DEFAULT_MIN, DEFAULT_SIDES, flip_coin, random_number, roll_dice,
        },
        errors::{Error, Result},
    };

    /// Generate random numbers, flip coins, or roll dice
    #[poise::command(
        slash_command,
        subcommands("number", "coin", "dice"),
        subcommand_required
    )]
    pub async fn random(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Generate a random number in a range
    #[poise::command(slash_command)]
    pub async fn number(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Minimum value (default: 1)"] min: Option<i64>,
        #[description = "Maximum value (default: 100)"] max: Option<i64>,
    ) -> Result<()> {
        let min = min.unwrap_or(DEFAULT_MIN);
        let max = max.unwrap_or(DEFAULT_MAX);

        let rolled = random_number(&mut rand::rng(), min, max);
        let value = match rolled {
            Ok(value) => value,
            Err(err) => return say_ephemeral(ctx, err.user_message().to_string()).await,
        };

        ctx.say(number_message(min, max, value)).await?;
        Ok(())
    }

    /// Flip a coin
    #[poise::command(slash_command)]
    pub async fn coin(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let side = flip_coin(&mut rand::rng());
        ctx.send(poise::CreateReply::default().embed(coin_embed(side)))
            .await?;
        Ok(())
    }

    /// Roll a die
    #[poise::command(slash_command)]
    pub async fn dice(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Number of sides (default: 6)"]
        #[min = 2]
        sides: Option<u32>,
    ) -> Result<()> {
        let sides = sides.unwrap_or(DEFAULT_SIDES);

        let rolled = roll_dice(&mut rand::rng(), sides);
        let value = match rolled {
            Ok(value) => value,
            Err(err) => return say_ephemeral(ctx, err.user_message().to_string()).await,
        };

        ctx.send(poise::CreateReply::default().embed(dice_embed(sides, value)))
            .await?;
        Ok(())
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_message() {
        assert_eq!(
            number_message(1, 100, 42),
            "🎲 Random number between 1 and 100: **42**"
        );
    }
}
