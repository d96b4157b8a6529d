//! Prompts for the analytics agent

/// One fixed chart request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualizationPrompt {
    /// Position in the list, used to order the rendered plots
    pub index: usize,
    /// Short file-name friendly label
    pub slug: &'static str,
    /// Natural-language chart specification
    pub text: &'static str,
}

/// Charts generated for every dataset, in display order
pub const VISUALIZATION_PROMPTS: &[VisualizationPrompt] = &[
    VisualizationPrompt {
        index: 0,
        slug: "candlestick",
        text: "Create a candlestick chart of the open, high, low and close prices of the stock \
               for each trading day over the period.",
    },
    VisualizationPrompt {
        index: 1,
        slug: "bollinger-bands",
        text: "Plot Bollinger Bands around the closing price to show volatility and potential \
               reversal points.",
    },
    VisualizationPrompt {
        index: 2,
        slug: "rsi",
        text: "Plot the RSI indicator to assess momentum and overbought/oversold conditions. \
               RSI above 70 indicates overbought, below 30 indicates oversold.",
    },
    VisualizationPrompt {
        index: 3,
        slug: "macd",
        text: "Plot the MACD indicator to identify trend changes and potential buy/sell signals: \
               the MACD line, the signal line, and a histogram of their difference.",
    },
    VisualizationPrompt {
        index: 4,
        slug: "daily-returns",
        text: "Plot a histogram of daily returns (percentage change in closing price) to show \
               the distribution of returns and assess risk.",
    },
    VisualizationPrompt {
        index: 5,
        slug: "high-low-close",
        text: "Plot the high, low and closing prices for each trading day over the period to \
               show daily price fluctuations.",
    },
    VisualizationPrompt {
        index: 6,
        slug: "moving-average",
        text: "Overlay a 44-day moving average line on the closing price chart to smooth out \
               fluctuations and identify long-term trends.",
    },
];

pub const DESCRIPTION_PROMPT: &str = r"You are a financial data analyst. You are given a summary of a
daily stock price dataset for a company listed on the National Stock Exchange of India.

Describe the dataset for an investor: what it covers, the overall trend, notable highs and
lows, and how volatile the price has been. Use plain prose in at most three short paragraphs.
Do not invent figures that are not supported by the data.";

pub const RECOMMENDATION_PROMPT: &str = r"You are a conservative equity research analyst. You are
given a summary of a daily stock price dataset.

Recommend which further analyses an investor should run on this data (for example trend,
volatility, momentum and drawdown studies) and what each would reveal for this particular stock.
Present the recommendations as a short numbered list. This is educational analysis, not
personalised investment advice; say so in one sentence at the end.";

pub const CHART_PROMPT: &str = r##"You render financial charts as SVG.

Reply with exactly one complete, self-contained SVG document (<svg xmlns="http://www.w3.org/2000/svg" ...>...</svg>)
of about 800x400 pixels and nothing else. Compute every value from the CSV rows you are given.
Include a title, labelled axes and a legend where it helps. Use no scripts, no external
resources and no fonts other than sans-serif."##;
