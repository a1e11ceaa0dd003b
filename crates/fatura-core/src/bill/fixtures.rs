//! Text layer of a reference bill, as produced by a PDF text extractor.

pub const SAMPLE_BILL: &str = r#"CEMIG DISTRIBUIÇÃO S.A. CNPJ 06.981.180/0001-16
Av. Barbacena, 1200 - Santo Agostinho - Belo Horizonte - MG
SELFWAY TREINAMENTO PERSONALIZADO LTDA
RUA HERCULANO DE FREITAS 215 AP 101
GUTIERREZ
30441-039 BELO HORIZONTE, MG
Nº DO CLIENTE          Nº DA INSTALAÇÃO
7204076116          3001116735
Referente a          Vencimento          Valor a pagar (R$)
JAN/2024          12/02/2024          172,59
NOTA FISCAL Nº 012345678 - SÉRIE 000
Datas de Leitura Anterior 05/12 Atual 05/01 Nº de dias 31
Valores Faturados
Itens da FaturaUnid.QuantPreço Unit (R$)com tributosValor (R$)Tarifa Unit.(R$)
Energia ElétricakWh 50 0,95628700 47,81 0,74906000
Energia SCEE s/ ICMSkWh 456 0,65313400 297,83 0,50958000
Energia compensada GD IkWh 456 0,48783000 -222,45 0,50958000
Contrib Ilum Publica Municipal 49,40
TOTAL 172,59
"#;

/// Same layout without net metering: a single energy row.
pub const BILL_WITHOUT_COMPENSATION: &str = r#"CEMIG DISTRIBUIÇÃO S.A. CNPJ 06.981.180/0001-16
Nº DO CLIENTE          Nº DA INSTALAÇÃO
7005400387          3000055479
Referente a          Vencimento          Valor a pagar (R$)
MAR/2024          10/04/2024          1.147,15
Energia ElétricakWh 1.200 0,91589000 1.099,07 0,71784000
Contrib Ilum Publica Municipal 48,08
"#;
