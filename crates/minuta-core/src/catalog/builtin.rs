//! Built-in placeholder catalog for inventory and partition drafts.

/// Token replaced with the drafting date instead of document data.
pub const LAVRATURA_DATE_TOKEN: &str = "¿Data_lav1>";

/// Placeholder tokens recognized in notarial draft templates, in resolution order.
pub const BUILTIN_TOKENS: &[&str] = &[
    // Deceased, spouse and family
    "¿nome_do_\"de_cujus\">",
    "¿nome_do_autor_da_heranca>",
    "¿nome_do(a)_viuva(o)-meeira(o)>",
    "¿nome_do(a)_viuvo(a)>",
    "¿viuvo(a)-meeiro(a)>",
    "¿regime>",
    "¿data_do_casamento>",
    "¿data_do_falecimento>",
    "¿nome_do_hospital>",
    "¿cidade>",
    "¿quantidade_de_filhos>",
    "¿nome_dos_filhos>",
    "¿nome_do_inventariante>",
    "¿nome_do_advogado>",
    // Real estate
    "¿DESCRICAO_DO(S)_BEM(NS)>",
    "¿MATRICULA_Nº>",
    "¿nº_do_cartorio>",
    "¿monte_mor>",
    "¿valor_da_meacao>",
    "¿incluir_o_nome_dos_herdeiros>",
    "¿incluir_o_percentual>",
    "¿incluir_valor_que_pertence_a_cada_herdeiro>",
    // ITCMD
    "¿nº_da_guia>",
    "¿valor>",
    // Death certificate
    "¿nº_da_matricula_da_cert._obito>",
    "¿oficio_do_cartorio>",
    "¿nº_do_termo>",
    "¿livro>",
    "¿fls>",
    "¿cartorio>",
    "¿data_de_expedicao>",
    "¿data_de_expedicao_obito>",
    "¿data_de_expedicao_casamento>",
    // Clearance certificates
    "¿nº__da_certidao>",
    "¿nº__da_certidao_receita_federal>",
    "¿data_da_emissao>",
    "¿incluir_hora_de_emissao>",
    "¿validade>",
    "¿cnd_de_iptu>",
    "¿inscricao_do_GDF>",
    "¿item_do_imovel>",
    "¿data_de_pagamento>",
    "¿valor_tributavel>",
    // CNIB
    "¿codigo_hash>",
    "¿resultado>",
    LAVRATURA_DATE_TOKEN,
    "¿modo_de_aquisicao>",
    "¿REGISTRO_Nº>",
    "¿VALOR_R$>",
    "¿MATRICULA->",
    // Vehicles
    "¿marca>",
    "¿cor>",
    "¿categoria>",
    "¿alcool/gasolina>",
    "¿placa>",
    "¿chassi>",
    "¿ano>",
    "¿modelo>",
    "¿renavam>",
    // Bank accounts
    "¿corrente_ou_poupanca>",
    "¿numero>",
    "¿agencia>",
    "¿nome_do_banco>",
    // Rural property
    "¿numero_rural>",
    "¿codigo_rural>",
    "¿numero_do_exercicio>",
    "¿area_total>",
    "¿nome_da_fazenda>",
    "¿fracao_minima>",
    "¿area_registrada>",
    "¿nirf>",
    "¿citar_demais_orgaos>",
    "¿quando_feito_por_procuracao>",
    "¿hora_da_emissao>",
    "¿nº>",
    "¿cidade]>",
    "¿qualificacao_do(a)(s)_herdeiro(a)(s)>",
];
